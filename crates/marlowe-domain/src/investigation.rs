//! Multi-turn investigation state primitives

use serde::{Deserialize, Serialize};

/// Lifecycle state of an investigation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestigationStatus {
    /// A pass is running
    Investigating,
    /// The last pass finished cleanly
    Complete,
    /// The last pass failed at the top level
    Error,
}

impl InvestigationStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestigationStatus::Investigating => "investigating",
            InvestigationStatus::Complete => "complete",
            InvestigationStatus::Error => "error",
        }
    }
}

/// Focus of a "deepen" turn
///
/// Parsed before any work starts; unknown values are rejected without
/// opening a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    /// Dig into the seller behind the listing
    Seller,
    /// Dig into review authenticity
    Reviews,
    /// Dig into the operating business
    Business,
    /// Look for reputable alternatives
    Alternatives,
    /// Dig into pricing history and anomalies
    PriceHistory,
}

impl Focus {
    /// Get the focus name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Seller => "seller",
            Focus::Reviews => "reviews",
            Focus::Business => "business",
            Focus::Alternatives => "alternatives",
            Focus::PriceHistory => "price_history",
        }
    }

    /// Parse a focus from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "seller" => Some(Focus::Seller),
            "reviews" => Some(Focus::Reviews),
            "business" => Some(Focus::Business),
            "alternatives" => Some(Focus::Alternatives),
            "price_history" => Some(Focus::PriceHistory),
            _ => None,
        }
    }
}

impl std::str::FromStr for Focus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid focus: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_round_trip() {
        for focus in [
            Focus::Seller,
            Focus::Reviews,
            Focus::Business,
            Focus::Alternatives,
            Focus::PriceHistory,
        ] {
            assert_eq!(Focus::parse(focus.as_str()), Some(focus));
        }
    }

    #[test]
    fn test_unknown_focus_rejected() {
        assert_eq!(Focus::parse("shipping"), None);
        assert!("shipping".parse::<Focus>().is_err());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(InvestigationStatus::Investigating.as_str(), "investigating");
        assert_eq!(InvestigationStatus::Complete.as_str(), "complete");
        assert_eq!(InvestigationStatus::Error.as_str(), "error");
    }
}
