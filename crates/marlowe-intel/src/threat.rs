//! Malicious-URL database client

use crate::error::{check_status, ProbeError};
use serde::Deserialize;

/// Result of a threat-database lookup
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatMatch {
    /// Whether the host appears in the database
    pub listed: bool,
    /// Threat classification, when listed (e.g. "phishing", "malware")
    #[serde(default)]
    pub threat_type: Option<String>,
    /// Reference url into the database, when listed
    #[serde(default)]
    pub reference: Option<String>,
}

/// Client for a malicious-URL database API
pub struct ThreatListClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl ThreatListClient {
    /// Create a new client; the timeout bounds every lookup
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Check whether a host is listed
    pub async fn check(&self, host: &str) -> Result<ThreatMatch, ProbeError> {
        let url = format!("{}/lookup", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Auth-Key", &self.api_key)
            .json(&serde_json::json!({ "host": host }))
            .send()
            .await
            .map_err(ProbeError::from_reqwest)?;
        check_status(&response)?;

        response
            .json::<ThreatMatch>()
            .await
            .map_err(|e| ProbeError::Parse(e.to_string()))
    }
}
