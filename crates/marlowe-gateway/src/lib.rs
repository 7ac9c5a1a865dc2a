//! Marlowe Gateway
//!
//! The HTTP surface of the investigation engine: starts sessions, deepens
//! them, analyzes product cohorts, and streams typed events over SSE.
//! Wires every layer together from one TOML config.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod products;
pub mod stream;

use config::GatewayConfig;
use handlers::{create_router, AppState};
use marlowe_domain::AllowList;
use marlowe_evidence::{ProducerDeps, ProducerRunner};
use marlowe_fraudcheck::FraudChecker;
use marlowe_intel::{
    CertificateInspector, ForumClient, PageFetcher, ThreatListClient, WhoisClient,
};
use marlowe_llm::{ChatApiProvider, ReasoningProvider};
use marlowe_search::{LlmShoppingProvider, SearchAggregator, SerpProvider};
use marlowe_session::{InMemorySessionStore, InvestigationOrchestrator};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Gateway error
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Component construction failed
    #[error("Initialization error: {0}")]
    Init(String),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the full application state from configuration
pub fn build_state(config: &GatewayConfig) -> Result<AppState, GatewayError> {
    let reasoner: Arc<dyn ReasoningProvider> = Arc::new(
        ChatApiProvider::with_timeout(
            &config.llm.endpoint,
            &config.llm.api_key,
            &config.llm.model,
            config.llm.timeout_secs,
        )
        .map_err(|e| GatewayError::Init(e.to_string()))?,
    );

    let lookup_timeout = config.intel.lookup_timeout();
    let deps = ProducerDeps {
        whois: Arc::new(
            WhoisClient::new(
                &config.intel.whois_endpoint,
                &config.intel.whois_api_key,
                lookup_timeout,
            )
            .map_err(|e| GatewayError::Init(e.to_string()))?,
        ),
        threat: Arc::new(
            ThreatListClient::new(
                &config.intel.threat_endpoint,
                &config.intel.threat_api_key,
                lookup_timeout,
            )
            .map_err(|e| GatewayError::Init(e.to_string()))?,
        ),
        forum: Arc::new(
            ForumClient::new(&config.intel.forum_endpoint, lookup_timeout)
                .map_err(|e| GatewayError::Init(e.to_string()))?,
        ),
        page: Arc::new(
            PageFetcher::new(lookup_timeout, config.intel.page_byte_cap)
                .map_err(|e| GatewayError::Init(e.to_string()))?,
        ),
        cert: Arc::new(CertificateInspector::new(config.intel.handshake_timeout())),
        reasoner: Arc::clone(&reasoner),
    };

    let allowlist = AllowList::with_extra(config.allowlist_extra.clone());
    let runner = ProducerRunner::new(Duration::from_secs(config.producer_timeout_secs));

    let orchestrator = InvestigationOrchestrator::new(
        Arc::new(InMemorySessionStore::new()),
        deps.clone(),
        runner.clone(),
        allowlist.clone(),
    );

    let primary = Arc::new(
        SerpProvider::with_timeout(
            &config.search.endpoint,
            &config.search.api_key,
            config.search.timeout_secs,
        )
        .map_err(|e| GatewayError::Init(e.to_string()))?,
    );
    let fallback = Arc::new(LlmShoppingProvider::new(Arc::clone(&reasoner)));
    let aggregator = Arc::new(SearchAggregator::new(primary, fallback));

    let checker = Arc::new(FraudChecker::new(deps, runner, allowlist.clone()));

    Ok(AppState {
        orchestrator: Arc::new(orchestrator),
        checker,
        aggregator,
        allowlist,
        session_idle_ttl: Duration::from_secs(config.session.idle_ttl_secs),
        session_capacity: config.session.max_sessions,
    })
}

/// Start the gateway HTTP server
pub async fn start_server(config: GatewayConfig) -> Result<(), GatewayError> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Marlowe gateway");
    info!("Bind address: {}", config.bind_addr());
    info!("Producer timeout: {}s", config.producer_timeout_secs);
    info!("Session capacity: {}", config.session.max_sessions);

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Gateway listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| GatewayError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_from_test_config() {
        let config = GatewayConfig::default_test_config();
        let state = build_state(&config).unwrap();
        assert_eq!(state.session_capacity, 512);
        assert!(state.allowlist.contains("amazon.com"));
    }
}
