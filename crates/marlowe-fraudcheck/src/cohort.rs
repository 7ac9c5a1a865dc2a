//! Cohort price statistics

use marlowe_domain::{AllowList, ProductResult};

/// Fraction of the trusted median below which a price is anomalous
pub const ANOMALY_DISCOUNT: f64 = 0.6;

/// Median price across cohort products on allow-listed domains
///
/// Only trusted retailers anchor the reference; an unknown shop undercutting
/// other unknown shops proves nothing.
pub fn trusted_median(cohort: &[ProductResult], allowlist: &AllowList) -> Option<f64> {
    let mut prices: Vec<f64> = cohort
        .iter()
        .filter(|p| allowlist.contains(&p.domain))
        .map(|p| p.price)
        .filter(|p| *p > 0.0)
        .collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(|a, b| a.partial_cmp(b).expect("prices are finite"));
    let mid = prices.len() / 2;
    if prices.len() % 2 == 0 {
        Some((prices[mid - 1] + prices[mid]) / 2.0)
    } else {
        Some(prices[mid])
    }
}

/// Whether a price sits at or beyond the anomaly threshold below the median
pub fn is_anomalous(price: f64, median: f64) -> bool {
    median > 0.0 && (median - price) / median >= ANOMALY_DISCOUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(domain: &str, price: f64) -> ProductResult {
        ProductResult {
            id: format!("{}-{}", domain, price),
            title: "Widget".to_string(),
            price,
            currency: "USD".to_string(),
            retailer: domain.to_string(),
            domain: domain.to_string(),
            url: format!("https://{}/widget", domain),
            image: None,
            rating: None,
            review_count: None,
        }
    }

    #[test]
    fn test_median_over_trusted_domains_only() {
        let cohort = vec![
            product("amazon.com", 95.0),
            product("walmart.com", 100.0),
            product("bestbuy.com", 105.0),
            product("sketchy.example", 20.0),
        ];
        let median = trusted_median(&cohort, &AllowList::builtin()).unwrap();
        assert_eq!(median, 100.0);
    }

    #[test]
    fn test_even_count_averages_middle_pair() {
        let cohort = vec![product("amazon.com", 90.0), product("walmart.com", 110.0)];
        let median = trusted_median(&cohort, &AllowList::builtin()).unwrap();
        assert_eq!(median, 100.0);
    }

    #[test]
    fn test_no_trusted_products_no_median() {
        let cohort = vec![product("sketchy.example", 20.0)];
        assert_eq!(trusted_median(&cohort, &AllowList::builtin()), None);
    }

    #[test]
    fn test_anomaly_threshold() {
        assert!(is_anomalous(35.0, 100.0)); // 65% below
        assert!(is_anomalous(40.0, 100.0)); // exactly 60% below
        assert!(!is_anomalous(45.0, 100.0)); // 55% below
        assert!(!is_anomalous(100.0, 0.0));
    }
}
