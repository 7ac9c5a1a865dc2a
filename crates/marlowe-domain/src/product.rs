//! Product listings produced by the search aggregator

use serde::{Deserialize, Serialize};

/// How many title characters participate in the cross-query dedup key
pub const DEDUP_TITLE_PREFIX: usize = 40;

/// A normalized product listing
///
/// Immutable once produced; downstream components reference products by
/// domain/url rather than copying listings around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResult {
    /// Stable identifier for event correlation
    pub id: String,

    /// Listing title
    pub title: String,

    /// Numeric price amount
    pub price: f64,

    /// ISO-ish currency code ("USD", "EUR", ...)
    pub currency: String,

    /// Shop label as the provider reported it
    pub retailer: String,

    /// Canonical retailer domain
    pub domain: String,

    /// Canonical listing url
    pub url: String,

    /// Listing image, when the provider had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Star rating, when the provider had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// Review count, when the provider had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
}

impl ProductResult {
    /// Cross-query dedup key: (domain, first 40 chars of lowercased title)
    pub fn dedup_key(&self) -> (String, String) {
        let title = self.title.to_lowercase();
        let prefix = title.chars().take(DEDUP_TITLE_PREFIX).collect();
        (self.domain.clone(), prefix)
    }
}
