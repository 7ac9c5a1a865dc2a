//! Error types for the search aggregator

use thiserror::Error;

/// Errors that can occur while searching for products
#[derive(Error, Debug)]
pub enum SearchError {
    /// Provider transport or API error
    #[error("Provider error: {0}")]
    Provider(String),

    /// The call exceeded its bounded timeout
    #[error("Search timed out")]
    Timeout,

    /// Credential rejected by the provider
    #[error("Authentication rejected")]
    AuthRejected,

    /// Provider response could not be parsed
    #[error("Malformed provider response: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    /// Normalize a reqwest transport error
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return SearchError::Timeout;
        }
        SearchError::Provider(e.to_string())
    }
}
