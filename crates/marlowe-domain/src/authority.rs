//! Domain authority table
//!
//! Static allow-list of globally well-known domains. A listed domain is
//! trusted without further checks: the fraud-check orchestrator short-circuits
//! on it and the veto scorer pins its score to zero regardless of other
//! records. The table is read-only and safe under unsynchronized concurrent
//! reads.

/// Globally well-known retail, marketplace, and platform domains
static TRUSTED_DOMAINS: &[&str] = &[
    "amazon.com",
    "amazon.co.uk",
    "amazon.de",
    "amazon.ca",
    "walmart.com",
    "target.com",
    "bestbuy.com",
    "ebay.com",
    "etsy.com",
    "apple.com",
    "costco.com",
    "homedepot.com",
    "lowes.com",
    "wayfair.com",
    "ikea.com",
    "nike.com",
    "adidas.com",
    "zara.com",
    "hm.com",
    "macys.com",
    "nordstrom.com",
    "sephora.com",
    "newegg.com",
    "bhphotovideo.com",
    "rei.com",
    "gamestop.com",
    "samsung.com",
    "dell.com",
    "lenovo.com",
    "microsoft.com",
    "google.com",
    "argos.co.uk",
    "johnlewis.com",
    "currys.co.uk",
    "jd.com",
    "rakuten.co.jp",
    "aliexpress.com",
    "zalando.de",
    "otto.de",
    "bol.com",
];

/// Multi-label public suffixes that registrable-root extraction must keep
static COMPOUND_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au", "co.nz", "co.jp",
    "or.jp", "com.br", "com.mx", "com.ar", "co.in", "com.sg", "com.hk", "co.kr", "com.tw",
];

/// Curated set of domains trusted without further checks
///
/// Wraps the builtin table plus any operator-supplied extras. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    extra: Vec<String>,
}

impl AllowList {
    /// The builtin table only
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Builtin table plus operator-supplied domains
    pub fn with_extra(extra: Vec<String>) -> Self {
        Self {
            extra: extra.into_iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    /// Whether a hostname (or its registrable root) is on the allow-list
    pub fn contains(&self, host: &str) -> bool {
        let host = normalize_host(host);
        if host.is_empty() {
            return false;
        }
        let root = registrable_root(&host);
        TRUSTED_DOMAINS
            .iter()
            .any(|d| *d == host || *d == root)
            || self.extra.iter().any(|d| *d == host || *d == root)
    }
}

/// Lowercase, strip scheme/port/path leftovers and a leading "www."
fn normalize_host(host: &str) -> String {
    let mut h = host.trim().to_lowercase();
    if let Some(rest) = h.strip_prefix("https://").or_else(|| h.strip_prefix("http://")) {
        h = rest.to_string();
    }
    if let Some(idx) = h.find(['/', ':', '?']) {
        h.truncate(idx);
    }
    h = h.trim_end_matches('.').to_string();
    h.strip_prefix("www.").map(str::to_string).unwrap_or(h)
}

/// Extract the registrable root of a hostname
///
/// Understands compound public suffixes, so `shop.example.co.uk` yields
/// `example.co.uk` rather than `co.uk`.
pub fn registrable_root(host: &str) -> String {
    let host = normalize_host(host);
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return host;
    }

    let last_two = labels[labels.len() - 2..].join(".");
    if COMPOUND_SUFFIXES.contains(&last_two.as_str()) {
        labels[labels.len() - 3..].join(".")
    } else {
        last_two
    }
}
