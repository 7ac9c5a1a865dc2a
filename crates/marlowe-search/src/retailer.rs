//! Shop-label to retailer-domain mapping
//!
//! Providers report free-form shop labels ("Amazon.com - Seller XYZ",
//! "Best Buy", "TechDeals via eBay"). Downstream components key on canonical
//! domains, so every label must map to one: lookup first, then suffix
//! stripping, then embedded-domain detection, then a slugify fallback.

use regex::Regex;
use std::sync::OnceLock;

/// Well-known shop labels and their canonical domains
static KNOWN_RETAILERS: &[(&str, &str)] = &[
    ("amazon", "amazon.com"),
    ("walmart", "walmart.com"),
    ("target", "target.com"),
    ("best buy", "bestbuy.com"),
    ("bestbuy", "bestbuy.com"),
    ("ebay", "ebay.com"),
    ("etsy", "etsy.com"),
    ("apple", "apple.com"),
    ("costco", "costco.com"),
    ("home depot", "homedepot.com"),
    ("lowe's", "lowes.com"),
    ("lowes", "lowes.com"),
    ("newegg", "newegg.com"),
    ("b&h", "bhphotovideo.com"),
    ("wayfair", "wayfair.com"),
    ("ikea", "ikea.com"),
    ("macy's", "macys.com"),
    ("nordstrom", "nordstrom.com"),
    ("sephora", "sephora.com"),
    ("rei", "rei.com"),
    ("gamestop", "gamestop.com"),
    ("john lewis", "johnlewis.com"),
    ("argos", "argos.co.uk"),
    ("currys", "currys.co.uk"),
    ("aliexpress", "aliexpress.com"),
];

/// Separators that introduce a seller or qualifier suffix
static LABEL_SEPARATORS: &[&str] = &[" - ", " | ", " • ", " – "];

fn embedded_domain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([a-z0-9][a-z0-9-]*(?:\.[a-z0-9][a-z0-9-]*)*\.(?:com|net|org|shop|store|co|io|de|fr|uk))")
            .expect("domain pattern compiles")
    })
}

/// Map a provider shop label to a canonical retailer domain
pub fn canonical_domain(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    if lowered.is_empty() {
        return "unknown.invalid".to_string();
    }

    // 1. Strip a seller suffix ("Amazon.com - Seller XYZ" -> "amazon.com")
    let mut primary = lowered.as_str();
    for sep in LABEL_SEPARATORS {
        if let Some(idx) = primary.find(sep) {
            primary = &primary[..idx];
        }
    }
    let primary = primary.trim();

    // 2. Known-retailer lookup on the stripped label
    for (name, domain) in KNOWN_RETAILERS {
        if primary == *name || primary.starts_with(&format!("{}.", name)) || primary == *domain {
            return (*domain).to_string();
        }
    }

    // 3. Embedded domain-like substring anywhere in the original label
    if let Some(m) = embedded_domain_regex().find(&lowered) {
        return m.as_str().to_string();
    }

    // 4. Slugify fallback: a stable, domain-shaped key for unknown shops
    let slug: String = primary
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if slug.is_empty() {
        "unknown.invalid".to_string()
    } else {
        format!("{}.com", slug)
    }
}
