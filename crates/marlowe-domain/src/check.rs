//! Per-product check outcomes
//!
//! Unlike the open-ended evidence stream, every product gets exactly one
//! outcome per named check slot.

use serde::{Deserialize, Serialize};

/// The closed set of per-product fraud checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    /// Domain-age-derived retailer standing
    RetailerReputation,
    /// Malicious-URL database lookup
    SafetyDatabase,
    /// Community-forum sentiment
    CommunitySentiment,
    /// Marketplace seller verification
    SellerVerification,
}

impl CheckName {
    /// All four check slots, in reporting order
    pub const ALL: [CheckName; 4] = [
        Self::RetailerReputation,
        Self::SafetyDatabase,
        Self::CommunitySentiment,
        Self::SellerVerification,
    ];

    /// Get the check name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::RetailerReputation => "retailer_reputation",
            CheckName::SafetyDatabase => "safety_database",
            CheckName::CommunitySentiment => "community_sentiment",
            CheckName::SellerVerification => "seller_verification",
        }
    }

    /// Weight of this slot in the trust score
    pub fn weight(&self) -> f64 {
        match self {
            CheckName::RetailerReputation => 0.30,
            CheckName::SafetyDatabase => 0.30,
            CheckName::CommunitySentiment => 0.20,
            CheckName::SellerVerification => 0.20,
        }
    }
}

/// Status of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// No issue found
    Passed,
    /// A non-conclusive concern, or the check itself failed to execute
    Warning,
    /// A confirmed problem
    Failed,
    /// Not yet evaluated
    Pending,
}

impl CheckStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Warning => "warning",
            CheckStatus::Failed => "failed",
            CheckStatus::Pending => "pending",
        }
    }
}

/// One named pass/warning/failed judgment for a single product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    /// Which slot this fills
    pub name: CheckName,

    /// Judgment
    pub status: CheckStatus,

    /// Human-readable explanation
    pub detail: String,

    /// Severity magnitude in [0, 1]; 0 is clean, 1 is worst
    pub severity: f64,
}

impl CheckOutcome {
    /// Create an outcome with severity clamped to [0, 1]
    pub fn new(
        name: CheckName,
        status: CheckStatus,
        detail: impl Into<String>,
        severity: f64,
    ) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
            severity: severity.clamp(0.0, 1.0),
        }
    }

    /// A clean pass for a slot
    pub fn passed(name: CheckName, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Passed, detail, 0.0)
    }

    /// True when this outcome is worse than `other` for the same slot
    pub fn is_worse_than(&self, other: &CheckOutcome) -> bool {
        self.severity > other.severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = CheckName::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_outcome_severity_clamped() {
        let outcome = CheckOutcome::new(
            CheckName::SafetyDatabase,
            CheckStatus::Failed,
            "listed",
            3.0,
        );
        assert_eq!(outcome.severity, 1.0);
    }

    #[test]
    fn test_passed_constructor() {
        let outcome = CheckOutcome::passed(CheckName::RetailerReputation, "established domain");
        assert_eq!(outcome.status, CheckStatus::Passed);
        assert_eq!(outcome.severity, 0.0);
    }

    #[test]
    fn test_worse_than_compares_severity() {
        let mild = CheckOutcome::new(CheckName::CommunitySentiment, CheckStatus::Warning, "a", 0.3);
        let bad = CheckOutcome::new(CheckName::CommunitySentiment, CheckStatus::Failed, "b", 0.9);
        assert!(bad.is_worse_than(&mild));
        assert!(!mild.is_worse_than(&bad));
    }

    #[test]
    fn test_check_name_strings() {
        assert_eq!(CheckName::RetailerReputation.as_str(), "retailer_reputation");
        assert_eq!(CheckName::SafetyDatabase.as_str(), "safety_database");
    }
}
