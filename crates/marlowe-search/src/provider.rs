//! Shopping-search providers
//!
//! The aggregator talks to providers through one trait; callers never learn
//! which provider served a request. The primary provider is a structured
//! shopping-search API; the fallback drives the reasoning model into the
//! same listing schema.

use crate::error::SearchError;
use async_trait::async_trait;
use marlowe_llm::parse::parse_json_array;
use marlowe_llm::ReasoningProvider;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// One unnormalized listing as a provider reported it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawListing {
    /// Listing title
    pub title: String,
    /// Display price string ("$1,249.00")
    #[serde(alias = "price")]
    pub price_text: String,
    /// Shop label as reported
    #[serde(alias = "source", alias = "shop")]
    pub shop_label: String,
    /// Listing url
    #[serde(default, alias = "link")]
    pub url: Option<String>,
    /// Listing image
    #[serde(default, alias = "thumbnail")]
    pub image: Option<String>,
    /// Star rating
    #[serde(default)]
    pub rating: Option<f64>,
    /// Review count
    #[serde(default, alias = "reviews")]
    pub review_count: Option<u32>,
}

/// A product-search capability
#[async_trait]
pub trait ShoppingProvider: Send + Sync {
    /// Run one free-text query, returning raw listings
    async fn search(&self, query: &str) -> Result<Vec<RawListing>, SearchError>;
}

/// Default timeout for shopping-search calls
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 12;

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    shopping_results: Vec<RawListing>,
}

/// Primary provider: a structured shopping-search API
pub struct SerpProvider {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl SerpProvider {
    /// Create a provider with the default timeout
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, SearchError> {
        Self::with_timeout(endpoint, api_key, DEFAULT_SEARCH_TIMEOUT_SECS)
    }

    /// Create a provider with an explicit timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SearchError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl ShoppingProvider for SerpProvider {
    async fn search(&self, query: &str) -> Result<Vec<RawListing>, SearchError> {
        let url = format!("{}/search", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", "shopping"),
                ("q", query),
                ("api_key", &self.api_key),
            ])
            .send()
            .await
            .map_err(SearchError::from_reqwest)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SearchError::AuthRejected);
        }
        if !status.is_success() {
            return Err(SearchError::Provider(format!("HTTP {}", status)));
        }

        let body: SerpResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(body.shopping_results)
    }
}

/// Fallback provider: free-form model search constrained to the listing schema
pub struct LlmShoppingProvider {
    reasoner: Arc<dyn ReasoningProvider>,
}

impl LlmShoppingProvider {
    /// Wrap a reasoning provider
    pub fn new(reasoner: Arc<dyn ReasoningProvider>) -> Self {
        Self { reasoner }
    }

    fn build_prompt(query: &str) -> String {
        format!(
            r#"Find current retail listings for: {}

Respond with a JSON array only, no markdown. Each element:
{{"title": "...", "price_text": "$99.99", "shop_label": "retailer name", "url": "https://... or null", "rating": 0.0-5.0 or null, "review_count": integer or null}}

Return up to 8 listings from distinct retailers. Return [] if nothing is found."#,
            query
        )
    }
}

#[async_trait]
impl ShoppingProvider for LlmShoppingProvider {
    async fn search(&self, query: &str) -> Result<Vec<RawListing>, SearchError> {
        let response = self
            .reasoner
            .generate(&Self::build_prompt(query))
            .await
            .map_err(|e| SearchError::Provider(e.to_string()))?;

        let values =
            parse_json_array(&response).map_err(|e| SearchError::Parse(e.to_string()))?;

        // Skip malformed elements rather than failing the whole response
        let mut listings = Vec::new();
        for (idx, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<RawListing>(value) {
                Ok(listing) => listings.push(listing),
                Err(e) => warn!(index = idx, error = %e, "Skipping malformed model listing"),
            }
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlowe_llm::MockProvider;

    #[test]
    fn test_raw_listing_accepts_provider_aliases() {
        let listing: RawListing = serde_json::from_str(
            r#"{"title": "Headphones", "price": "$99.00", "source": "Amazon", "link": "https://amazon.com/x", "reviews": 321}"#,
        )
        .unwrap();
        assert_eq!(listing.price_text, "$99.00");
        assert_eq!(listing.shop_label, "Amazon");
        assert_eq!(listing.review_count, Some(321));
    }

    #[tokio::test]
    async fn test_llm_provider_parses_listings() {
        let provider = LlmShoppingProvider::new(Arc::new(MockProvider::new(
            r#"[{"title": "Widget", "price_text": "$10.00", "shop_label": "WidgetCo"}]"#,
        )));
        let listings = provider.search("widget").await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Widget");
    }

    #[tokio::test]
    async fn test_llm_provider_skips_malformed_elements() {
        let provider = LlmShoppingProvider::new(Arc::new(MockProvider::new(
            r#"[{"title": "Ok", "price_text": "$5", "shop_label": "Shop"}, {"not": "a listing"}]"#,
        )));
        let listings = provider.search("anything").await.unwrap();
        assert_eq!(listings.len(), 1);
    }

    #[tokio::test]
    async fn test_llm_provider_empty_array() {
        let provider = LlmShoppingProvider::new(Arc::new(MockProvider::new("[]")));
        let listings = provider.search("nothing").await.unwrap();
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn test_llm_provider_non_array_is_parse_error() {
        let provider = LlmShoppingProvider::new(Arc::new(MockProvider::new("I found nothing")));
        assert!(matches!(
            provider.search("x").await,
            Err(SearchError::Parse(_))
        ));
    }
}
