//! Trust verdicts derived from check outcomes

use serde::{Deserialize, Serialize};

/// Trust score below which a product is dangerous
pub const CAUTION_THRESHOLD: u8 = 40;
/// Trust score at or above which a product is trusted
pub const TRUSTED_THRESHOLD: u8 = 70;

/// Three-way trust classification
///
/// Derived only - never stored as independent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Safe to proceed
    Trusted,
    /// Proceed with care
    Caution,
    /// Do not proceed
    Danger,
}

impl Verdict {
    /// Get the verdict name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Trusted => "trusted",
            Verdict::Caution => "caution",
            Verdict::Danger => "danger",
        }
    }

    /// Classify a trust score in [0, 100]
    ///
    /// Callers that know about hard failures (a failed check with severity
    /// >= 0.8) must apply that danger override before consulting the score.
    pub fn from_score(score: u8) -> Self {
        if score >= TRUSTED_THRESHOLD {
            Verdict::Trusted
        } else if score >= CAUTION_THRESHOLD {
            Verdict::Caution
        } else {
            Verdict::Danger
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_boundaries() {
        assert_eq!(Verdict::from_score(100), Verdict::Trusted);
        assert_eq!(Verdict::from_score(70), Verdict::Trusted);
        assert_eq!(Verdict::from_score(69), Verdict::Caution);
        assert_eq!(Verdict::from_score(40), Verdict::Caution);
        assert_eq!(Verdict::from_score(39), Verdict::Danger);
        assert_eq!(Verdict::from_score(0), Verdict::Danger);
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Verdict::Danger).unwrap(),
            "\"danger\""
        );
    }
}
