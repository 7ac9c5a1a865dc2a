//! Cross-query search aggregation
//!
//! Runs every query concurrently against the primary provider, normalizes
//! listings into `ProductResult`s, and deduplicates across queries. When the
//! primary is unavailable or returns nothing, the same queries run against
//! the fallback provider; callers cannot tell which provider served them.

use crate::price::parse_price;
use crate::provider::{RawListing, ShoppingProvider};
use crate::retailer::canonical_domain;
use marlowe_domain::ProductResult;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Aggregates product search across providers and queries
pub struct SearchAggregator {
    primary: Arc<dyn ShoppingProvider>,
    fallback: Arc<dyn ShoppingProvider>,
}

impl SearchAggregator {
    /// Create an aggregator over a primary and a fallback provider
    pub fn new(primary: Arc<dyn ShoppingProvider>, fallback: Arc<dyn ShoppingProvider>) -> Self {
        Self { primary, fallback }
    }

    /// Run all queries and return deduplicated products
    ///
    /// No ordering guarantee; callers sort explicitly when they need one.
    pub async fn search_all(&self, queries: &[String]) -> Vec<ProductResult> {
        let listings = self.gather(Arc::clone(&self.primary), queries).await;

        let listings = if listings.is_empty() {
            info!("Primary provider returned nothing; falling back");
            self.gather(Arc::clone(&self.fallback), queries).await
        } else {
            listings
        };

        dedup(listings.into_iter().filter_map(normalize).collect())
    }

    /// Fan the queries out concurrently against one provider
    async fn gather(
        &self,
        provider: Arc<dyn ShoppingProvider>,
        queries: &[String],
    ) -> Vec<RawListing> {
        let mut set = JoinSet::new();
        for query in queries {
            let provider = Arc::clone(&provider);
            let query = query.clone();
            set.spawn(async move {
                let result = provider.search(&query).await;
                (query, result)
            });
        }

        let mut listings = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(found))) => listings.extend(found),
                Ok((query, Err(e))) => {
                    // One failed query must not suppress the others
                    warn!(query = %query, error = %e, "Search query failed");
                }
                Err(e) => warn!(error = %e, "Search task failed to join"),
            }
        }
        listings
    }
}

/// Normalize one raw listing into a product, or drop it
fn normalize(listing: RawListing) -> Option<ProductResult> {
    let Some(parsed) = parse_price(&listing.price_text) else {
        debug!(price = %listing.price_text, "Dropping listing with unparseable price");
        return None;
    };
    let domain = canonical_domain(&listing.shop_label);
    let url = listing
        .url
        .unwrap_or_else(|| format!("https://{}/", domain));

    Some(ProductResult {
        id: uuid::Uuid::now_v7().to_string(),
        title: listing.title,
        price: parsed.amount,
        currency: parsed.currency.to_string(),
        retailer: listing.shop_label,
        domain,
        url,
        image: listing.image,
        rating: listing.rating,
        review_count: listing.review_count,
    })
}

/// Drop duplicates across queries by (domain, title-prefix) key
fn dedup(products: Vec<ProductResult>) -> Vec<ProductResult> {
    let mut seen = HashSet::new();
    products
        .into_iter()
        .filter(|p| seen.insert(p.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider {
        listings: Vec<RawListing>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl StaticProvider {
        fn with(listings: Vec<RawListing>) -> Arc<Self> {
            Arc::new(Self {
                listings,
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                listings: Vec::new(),
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl ShoppingProvider for StaticProvider {
        async fn search(&self, _query: &str) -> Result<Vec<RawListing>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SearchError::Provider("down".to_string()));
            }
            Ok(self.listings.clone())
        }
    }

    fn listing(title: &str, price: &str, shop: &str) -> RawListing {
        RawListing {
            title: title.to_string(),
            price_text: price.to_string(),
            shop_label: shop.to_string(),
            url: None,
            image: None,
            rating: None,
            review_count: None,
        }
    }

    #[tokio::test]
    async fn test_identical_listings_across_queries_dedup_to_one() {
        let primary = StaticProvider::with(vec![listing(
            "Wireless Headphones XM5 Noise Cancelling Black",
            "$199.00",
            "Amazon",
        )]);
        let aggregator = SearchAggregator::new(primary, StaticProvider::failing());

        let products = aggregator
            .search_all(&["headphones".to_string(), "xm5 headphones".to_string()])
            .await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].domain, "amazon.com");
    }

    #[tokio::test]
    async fn test_price_parses_to_numeric() {
        let primary = StaticProvider::with(vec![listing("Laptop", "$1,249.00", "Best Buy")]);
        let aggregator = SearchAggregator::new(primary, StaticProvider::failing());

        let products = aggregator.search_all(&["laptop".to_string()]).await;
        assert_eq!(products[0].price, 1249.00);
        assert_eq!(products[0].currency, "USD");
    }

    #[tokio::test]
    async fn test_unparseable_price_drops_listing() {
        let primary = StaticProvider::with(vec![
            listing("Good", "$10.00", "Shop A"),
            listing("Bad", "call for price", "Shop B"),
        ]);
        let aggregator = SearchAggregator::new(primary, StaticProvider::failing());

        let products = aggregator.search_all(&["q".to_string()]).await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Good");
    }

    #[tokio::test]
    async fn test_fallback_used_when_primary_errors() {
        let primary = StaticProvider::failing();
        let fallback = StaticProvider::with(vec![listing("Widget", "$5.00", "WidgetCo")]);
        let fallback_handle = Arc::clone(&fallback);
        let aggregator = SearchAggregator::new(primary, fallback);

        let products = aggregator.search_all(&["widget".to_string()]).await;
        assert_eq!(products.len(), 1);
        assert_eq!(fallback_handle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_used_when_primary_returns_nothing() {
        let primary = StaticProvider::with(Vec::new());
        let fallback = StaticProvider::with(vec![listing("Widget", "$5.00", "WidgetCo")]);
        let primary_handle = Arc::clone(&primary);
        let fallback_handle = Arc::clone(&fallback);
        let aggregator = SearchAggregator::new(primary, fallback);

        let products = aggregator.search_all(&["widget".to_string()]).await;
        assert_eq!(products.len(), 1);
        assert_eq!(primary_handle.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_handle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_yields_empty_set() {
        let aggregator =
            SearchAggregator::new(StaticProvider::failing(), StaticProvider::failing());
        let products = aggregator.search_all(&["q".to_string()]).await;
        assert!(products.is_empty());
    }
}
