//! Investigation target and shared producer dependencies

use marlowe_domain::{classify, EvidenceRecord};
use marlowe_intel::{
    CertificateInspector, ForumClient, PageFetcher, ProbeError, ThreatListClient, WhoisClient,
};
use marlowe_llm::ReasoningProvider;
use std::sync::Arc;

use crate::kind::ProducerKind;

/// What a producer round investigates
#[derive(Debug, Clone)]
pub struct Target {
    /// Full url under investigation
    pub url: String,
    /// Hostname extracted from the url
    pub host: String,
    /// Listed price, when the target came from a product listing
    pub listed_price: Option<f64>,
    /// Trusted-cohort median price, when one is known
    pub reference_price: Option<f64>,
}

impl Target {
    /// Build a target from a url, extracting the hostname
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let host = extract_host(&url);
        Self {
            url,
            host,
            listed_price: None,
            reference_price: None,
        }
    }

    /// Attach pricing context for the price producer
    pub fn with_prices(mut self, listed: Option<f64>, reference: Option<f64>) -> Self {
        self.listed_price = listed;
        self.reference_price = reference;
        self
    }
}

fn extract_host(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let end = without_scheme
        .find(['/', '?', '#'])
        .unwrap_or(without_scheme.len());
    let authority = &without_scheme[..end];
    let host = authority.rsplit('@').next().unwrap_or(authority);
    host.split(':').next().unwrap_or(host).to_lowercase()
}

/// Shared clients every producer can draw on
///
/// Arc-held so a round can fan producers out across tasks.
#[derive(Clone)]
pub struct ProducerDeps {
    /// WHOIS lookups
    pub whois: Arc<WhoisClient>,
    /// Malicious-URL database
    pub threat: Arc<ThreatListClient>,
    /// Community-forum search
    pub forum: Arc<ForumClient>,
    /// Page fetches
    pub page: Arc<PageFetcher>,
    /// Raw-TLS certificate introspection
    pub cert: Arc<CertificateInspector>,
    /// Reasoning model, for classifier-backed producers
    pub reasoner: Arc<dyn ReasoningProvider>,
}

/// Convert a failed probe into the low-confidence record the contract demands
///
/// Never panics, never propagates: the classifier decides severity and
/// whether the failure itself is a weak signal.
pub fn failure_record(kind: ProducerKind, source: &str, err: &ProbeError) -> EvidenceRecord {
    let classification = classify(&err.failure_kind());
    EvidenceRecord::new(
        kind.category(),
        classification.severity,
        format!("{} check unavailable", source),
        format!("{}", err),
        source,
        classification.confidence(),
    )
}
