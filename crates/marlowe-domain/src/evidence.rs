//! Evidence records - the fundamental unit of an investigation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for an evidence record based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability, so a session's evidence list orders by creation
/// - 128-bit uniqueness with no coordination between concurrent producers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceId(uuid::Uuid);

impl EvidenceId {
    /// Generate a new UUIDv7-based EvidenceId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse an EvidenceId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid evidence id: {}", e))
    }
}

impl Default for EvidenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a single observation
///
/// Variant order matters: derived `Ord` gives `Safe < Info < Warning < Critical`,
/// which is the comparison the scoring engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Affirmative evidence the target is fine
    Safe,
    /// Ambiguous or low-value observation
    Info,
    /// A real but non-conclusive red flag
    Warning,
    /// A strong fraud indicator
    Critical,
}

impl Severity {
    /// Get the severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "safe",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Parse a severity from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "safe" => Some(Severity::Safe),
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid severity: {}", s))
    }
}

/// Information source a record came from
///
/// Closed set: each evidence producer owns exactly one category, and the
/// scoring tiers match on categories rather than free-form labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    /// WHOIS-derived registration age
    DomainAge,
    /// TLS certificate introspection
    Certificate,
    /// Malicious-URL database match
    ThreatList,
    /// On-page content heuristics
    Content,
    /// Community-forum reputation search
    Reputation,
    /// Brand-impersonation classification
    BrandImpersonation,
    /// Marketplace seller verification
    SellerVerification,
    /// Cohort price comparison
    Price,
}

impl EvidenceCategory {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceCategory::DomainAge => "domain_age",
            EvidenceCategory::Certificate => "certificate",
            EvidenceCategory::ThreatList => "threat_list",
            EvidenceCategory::Content => "content",
            EvidenceCategory::Reputation => "reputation",
            EvidenceCategory::BrandImpersonation => "brand_impersonation",
            EvidenceCategory::SellerVerification => "seller_verification",
            EvidenceCategory::Price => "price",
        }
    }
}

/// One atomic, source-attributed observation about a URL
///
/// Records are immutable once created; a deeper investigation turn appends
/// new records rather than editing old ones. Related ids are advisory graph
/// edges, not ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    /// Unique identifier
    pub id: EvidenceId,

    /// Which producer category this came from
    pub category: EvidenceCategory,

    /// How strongly this observation indicates fraud
    pub severity: Severity,

    /// Short human-readable headline
    pub title: String,

    /// Longer explanation of what was observed
    pub detail: String,

    /// Label of the information source (e.g. "whois", "urlhaus")
    pub source: String,

    /// Confidence in the observation, in [0, 1]
    pub confidence: f64,

    /// Advisory edges to related evidence
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<EvidenceId>,

    /// Free-form key/value annotations (e.g. certificate issuer)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl EvidenceRecord {
    /// Create a new record with a fresh id and confidence clamped to [0, 1]
    pub fn new(
        category: EvidenceCategory,
        severity: Severity,
        title: impl Into<String>,
        detail: impl Into<String>,
        source: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: EvidenceId::new(),
            category,
            severity,
            title: title.into(),
            detail: detail.into(),
            source: source.into(),
            confidence: confidence.clamp(0.0, 1.0),
            related: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry (construction-time only)
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach an advisory edge to another record (construction-time only)
    pub fn with_related(mut self, id: EvidenceId) -> Self {
        self.related.push(id);
        self
    }

    /// Key identifying a repeated observation across turns
    ///
    /// Deepening a session must not re-emit a record that duplicates a prior
    /// turn's source and title.
    pub fn dedup_key(&self) -> (String, String) {
        (self.source.clone(), self.title.to_lowercase())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: constructed records always hold confidence in [0, 1]
        #[test]
        fn test_confidence_always_in_range(confidence in -10.0f64..10.0) {
            let record = EvidenceRecord::new(
                EvidenceCategory::Content,
                Severity::Info,
                "t",
                "d",
                "s",
                confidence,
            );
            prop_assert!((0.0..=1.0).contains(&record.confidence));
        }

        /// Property: severity string round-trips through parse
        #[test]
        fn test_severity_proptest_roundtrip(idx in 0usize..4) {
            let all = [Severity::Safe, Severity::Info, Severity::Warning, Severity::Critical];
            let sev = all[idx];
            prop_assert_eq!(Severity::parse(sev.as_str()), Some(sev));
        }
    }
}
