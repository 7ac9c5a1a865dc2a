//! Configuration file parsing for the gateway
//!
//! Loads settings from TOML: bind address, model endpoint and credential,
//! lookup endpoints, search provider, session lifecycle, and allow-list
//! extras.

use marlowe_intel::IntelConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Gateway configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing or invalid field
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Reasoning-model endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API base url
    pub endpoint: String,
    /// Bearer credential
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Request timeout (seconds)
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// Shopping-search provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Provider base url
    pub endpoint: String,
    /// Provider credential
    pub api_key: String,
    /// Request timeout (seconds)
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

/// Session lifecycle settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle seconds after which a finished session may be evicted
    #[serde(default = "default_session_idle")]
    pub idle_ttl_secs: u64,
    /// Hard cap on stored sessions
    #[serde(default = "default_session_capacity")]
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: default_session_idle(),
            max_sessions: default_session_capacity(),
        }
    }
}

/// Gateway configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Bind address (e.g. "127.0.0.1")
    pub bind_address: String,

    /// Bind port
    pub bind_port: u16,

    /// Reasoning-model settings
    pub llm: LlmConfig,

    /// Lookup-client settings
    pub intel: IntelConfig,

    /// Shopping-search settings
    pub search: SearchConfig,

    /// Session lifecycle settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Per-producer timeout (seconds)
    #[serde(default = "default_producer_timeout")]
    pub producer_timeout_secs: u64,

    /// Operator-supplied additions to the domain allow-list
    #[serde(default)]
    pub allowlist_extra: Vec<String>,
}

fn default_llm_timeout() -> u64 {
    20
}

fn default_search_timeout() -> u64 {
    12
}

fn default_session_idle() -> u64 {
    1800
}

fn default_session_capacity() -> usize {
    512
}

fn default_producer_timeout() -> u64 {
    20
}

impl GatewayConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: GatewayConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.is_empty() {
            return Err(ConfigError::Invalid("llm.api_key is empty".to_string()));
        }
        if self.producer_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "producer_timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.intel
            .validate()
            .map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Create a default configuration for testing
    ///
    /// Every endpoint points at a dead localhost port, so tests exercising
    /// the full pipeline see fast classified failures instead of hangs.
    pub fn default_test_config() -> Self {
        GatewayConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            llm: LlmConfig {
                endpoint: "http://127.0.0.1:9800/v1".to_string(),
                api_key: "test-key-do-not-use-in-production".to_string(),
                model: "test-model".to_string(),
                timeout_secs: 2,
            },
            intel: IntelConfig {
                lookup_timeout_secs: 1,
                handshake_timeout_secs: 1,
                ..IntelConfig::default_test_config()
            },
            search: SearchConfig {
                endpoint: "http://127.0.0.1:9804".to_string(),
                api_key: "test-key".to_string(),
                timeout_secs: 1,
            },
            session: SessionConfig::default(),
            producer_timeout_secs: 5,
            allowlist_extra: Vec::new(),
        }
    }
}
