//! Marlowe Search Aggregator
//!
//! Product search with provider fallback: free-text queries fan out
//! concurrently against a structured shopping-search provider, results are
//! normalized (numeric prices, canonical retailer domains) and deduplicated
//! across queries, and a reasoning-model fallback serves the same schema
//! when the primary is unavailable or empty.

#![warn(missing_docs)]

pub mod aggregator;
pub mod error;
pub mod price;
pub mod provider;
pub mod retailer;

pub use aggregator::SearchAggregator;
pub use error::SearchError;
pub use price::{parse_price, ParsedPrice};
pub use provider::{LlmShoppingProvider, RawListing, SerpProvider, ShoppingProvider};
pub use retailer::canonical_domain;
