//! Price-comparison producer
//!
//! Compares the listed price against the trusted-cohort median. A price far
//! below what reputable retailers charge is the classic too-good-to-be-true
//! lure; without a reference there is nothing to conclude.

use crate::target::Target;
use marlowe_domain::{EvidenceCategory, EvidenceRecord, Severity};

const SOURCE: &str = "price";

/// Fraction below the reference at which the price is a strong indicator
pub const CRITICAL_DISCOUNT: f64 = 0.6;
/// Fraction below the reference at which the price is a mild concern
pub const WARNING_DISCOUNT: f64 = 0.4;

/// Compare the listed price against the cohort reference
pub async fn run(target: &Target) -> Vec<EvidenceRecord> {
    vec![judge(target.listed_price, target.reference_price)]
}

fn judge(listed: Option<f64>, reference: Option<f64>) -> EvidenceRecord {
    let (price, reference) = match (listed, reference) {
        (Some(p), Some(r)) if r > 0.0 => (p, r),
        _ => {
            return EvidenceRecord::new(
                EvidenceCategory::Price,
                Severity::Info,
                "No price reference",
                "No trusted-cohort median available to compare against",
                SOURCE,
                0.0,
            )
        }
    };

    let below = (reference - price) / reference;
    let percent = (below * 100.0).round() as i64;

    if below >= CRITICAL_DISCOUNT {
        EvidenceRecord::new(
            EvidenceCategory::Price,
            Severity::Critical,
            format!("Price {}% below trusted retailers", percent),
            format!(
                "Listed at {:.2} against a trusted-cohort median of {:.2}; too good to be true",
                price, reference
            ),
            SOURCE,
            0.85,
        )
        .with_metadata("below_median_pct", percent.to_string())
    } else if below >= WARNING_DISCOUNT {
        EvidenceRecord::new(
            EvidenceCategory::Price,
            Severity::Warning,
            format!("Price {}% below trusted retailers", percent),
            format!(
                "Listed at {:.2} against a trusted-cohort median of {:.2}",
                price, reference
            ),
            SOURCE,
            0.6,
        )
        .with_metadata("below_median_pct", percent.to_string())
    } else {
        EvidenceRecord::new(
            EvidenceCategory::Price,
            Severity::Safe,
            "Price in line with the market",
            format!(
                "Listed at {:.2}, within the normal range of the trusted cohort ({:.2})",
                price, reference
            ),
            SOURCE,
            0.7,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixty_five_percent_below_is_critical() {
        let record = judge(Some(35.0), Some(100.0));
        assert_eq!(record.severity, Severity::Critical);
        assert_eq!(record.metadata.get("below_median_pct").unwrap(), "65");
    }

    #[test]
    fn test_forty_five_percent_below_is_warning() {
        let record = judge(Some(55.0), Some(100.0));
        assert_eq!(record.severity, Severity::Warning);
    }

    #[test]
    fn test_market_price_is_safe() {
        let record = judge(Some(95.0), Some(100.0));
        assert_eq!(record.severity, Severity::Safe);
    }

    #[test]
    fn test_missing_reference_is_zero_confidence_info() {
        let record = judge(Some(35.0), None);
        assert_eq!(record.severity, Severity::Info);
        assert_eq!(record.confidence, 0.0);

        let record = judge(None, Some(100.0));
        assert_eq!(record.severity, Severity::Info);
    }

    #[test]
    fn test_above_market_price_is_safe() {
        let record = judge(Some(140.0), Some(100.0));
        assert_eq!(record.severity, Severity::Safe);
    }
}
