//! Configuration for the lookup clients

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoints, credentials, and timeouts for every external lookup
///
/// Every external call carries a bounded timeout rather than an unbounded
/// wait; the defaults sit inside the 8-20 second window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelConfig {
    /// WHOIS JSON API base url
    pub whois_endpoint: String,
    /// WHOIS API credential
    #[serde(default)]
    pub whois_api_key: String,

    /// Malicious-URL database base url
    pub threat_endpoint: String,
    /// Threat database credential
    #[serde(default)]
    pub threat_api_key: String,

    /// Community-forum search base url
    pub forum_endpoint: String,

    /// Timeout for HTTP lookups (seconds)
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,

    /// Timeout for the raw TLS handshake (seconds)
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,

    /// Page-fetch body cap (bytes)
    #[serde(default = "default_page_cap")]
    pub page_byte_cap: usize,
}

fn default_lookup_timeout() -> u64 {
    10
}

fn default_handshake_timeout() -> u64 {
    8
}

fn default_page_cap() -> usize {
    512 * 1024
}

impl IntelConfig {
    /// Lookup timeout as a Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Handshake timeout as a Duration
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.lookup_timeout_secs == 0 {
            return Err("lookup_timeout_secs must be greater than 0".to_string());
        }
        if self.handshake_timeout_secs == 0 {
            return Err("handshake_timeout_secs must be greater than 0".to_string());
        }
        if self.page_byte_cap == 0 {
            return Err("page_byte_cap must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Defaults suitable for tests; endpoints point at localhost
    pub fn default_test_config() -> Self {
        Self {
            whois_endpoint: "http://127.0.0.1:9801".to_string(),
            whois_api_key: "test-key".to_string(),
            threat_endpoint: "http://127.0.0.1:9802".to_string(),
            threat_api_key: "test-key".to_string(),
            forum_endpoint: "http://127.0.0.1:9803".to_string(),
            lookup_timeout_secs: 10,
            handshake_timeout_secs: 8,
            page_byte_cap: 512 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(IntelConfig::default_test_config().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = IntelConfig::default_test_config();
        config.lookup_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = IntelConfig::default_test_config();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: IntelConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.whois_endpoint, config.whois_endpoint);
        assert_eq!(parsed.lookup_timeout_secs, config.lookup_timeout_secs);
    }
}
