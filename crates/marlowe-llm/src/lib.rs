//! Marlowe Reasoning-Model Provider Layer
//!
//! Pluggable reasoning-model providers. The engine treats model calls as an
//! opaque external capability: prompt in, text out. Planning and narrative
//! synthesis both go through the same `ReasoningProvider` seam.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic mock for testing
//! - `ChatApiProvider`: HTTP chat-completions endpoint integration
//!
//! # Examples
//!
//! ```
//! use marlowe_llm::{MockProvider, ReasoningProvider};
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("Hello from the model");
//! let result = provider.generate("any prompt").await.unwrap();
//! assert_eq!(result, "Hello from the model");
//! # });
//! ```

#![warn(missing_docs)]

pub mod chat;
pub mod parse;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use chat::ChatApiProvider;

/// Errors that can occur during reasoning-model operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The call exceeded its bounded timeout
    #[error("Model call timed out")]
    Timeout,

    /// Invalid response from the model endpoint
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credential rejected by the endpoint
    #[error("Authentication rejected")]
    AuthRejected,

    /// Generic error
    #[error("Model error: {0}")]
    Other(String),
}

/// Trait for reasoning-model operations
///
/// Every call carries a bounded timeout and is attempted exactly once; a
/// transient failure surfaces as an error for the caller to classify, never
/// as a retried call.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Generate a text completion for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Mock reasoning provider for deterministic testing
///
/// Returns pre-configured responses without any network calls. Specific
/// responses are keyed on a substring of the prompt, so orchestrator tests
/// can script the planning and synthesis turns separately.
///
/// # Examples
///
/// ```
/// use marlowe_llm::{MockProvider, ReasoningProvider};
///
/// # tokio_test::block_on(async {
/// let mut provider = MockProvider::new("fallback");
/// provider.add_response("plan", "[\"domain_age\"]");
/// assert_eq!(provider.generate("please plan this").await.unwrap(), "[\"domain_age\"]");
/// assert_eq!(provider.generate("anything else").await.unwrap(), "fallback");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
    fail_always: Arc<Mutex<bool>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            fail_always: Arc::new(Mutex::new(false)),
        }
    }

    /// Add a response returned when the prompt contains `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(fragment.into(), response.into());
    }

    /// Make every subsequent call fail
    pub fn fail_all(&self) {
        *self.fail_always.lock().unwrap() = true;
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl ReasoningProvider for MockProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap() += 1;

        if *self.fail_always.lock().unwrap() {
            return Err(LlmError::Communication("mock failure".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        for (fragment, response) in responses.iter() {
            if prompt.contains(fragment) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt").await.unwrap();
        assert_eq!(result, "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_fragment_match() {
        let mut provider = MockProvider::default();
        provider.add_response("which checks", "[\"certificate\"]");
        provider.add_response("summarize", "All clear.");

        assert_eq!(
            provider.generate("decide which checks to run").await.unwrap(),
            "[\"certificate\"]"
        );
        assert_eq!(
            provider.generate("summarize the findings").await.unwrap(),
            "All clear."
        );
        assert_eq!(
            provider.generate("unrelated").await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("x");
        assert_eq!(provider.call_count(), 0);
        provider.generate("a").await.unwrap();
        provider.generate("b").await.unwrap();
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_provider_failure_mode() {
        let provider = MockProvider::new("x");
        provider.fail_all();
        let result = provider.generate("prompt").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_count() {
        let provider1 = MockProvider::new("x");
        let provider2 = provider1.clone();
        provider1.generate("a").await.unwrap();
        assert_eq!(provider2.call_count(), 1);
    }
}
