//! Two-stage scoring over an evidence set
//!
//! The incremental score streams live as records arrive and is an explicit
//! estimate. The veto score runs once after a round completes and is the
//! authoritative value: a few strong, corroborating signals dominate a pile
//! of weak ones, and a known-authority domain is never flagged regardless of
//! noise.

use crate::authority::AllowList;
use crate::evidence::{EvidenceCategory, EvidenceRecord, Severity};

/// Brand-impersonation confidence required to trigger the critical veto
pub const IMPERSONATION_VETO_CONFIDENCE: f64 = 0.8;

/// Metadata key a certificate record sets when its issuer is a free/automated CA
pub const FREE_CA_METADATA_KEY: &str = "issuer_free_ca";

/// Additive weight of one record, by severity
pub fn severity_delta(severity: Severity) -> i32 {
    match severity {
        Severity::Critical => 20,
        Severity::Warning => 10,
        Severity::Info => 2,
        Severity::Safe => -5,
    }
}

/// Live additive score, updated per record
///
/// The raw signed total is preserved across adds; only the reported value is
/// clamped to [0, 100]. Keeping the raw total means a safe record followed by
/// a critical one reports the same score as the reverse order.
#[derive(Debug, Clone, Default)]
pub struct IncrementalScore {
    raw: i32,
}

impl IncrementalScore {
    /// Start from zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record and return the clamped current score
    pub fn add(&mut self, severity: Severity) -> u8 {
        self.raw += severity_delta(severity);
        self.score()
    }

    /// Current score, clamped to [0, 100]
    pub fn score(&self) -> u8 {
        self.raw.clamp(0, 100) as u8
    }
}

/// Additive formula applied once over a full record set
pub fn additive_score(records: &[EvidenceRecord]) -> u8 {
    let raw: i32 = records.iter().map(|r| severity_delta(r.severity)).sum();
    raw.clamp(0, 100) as u8
}

/// Inputs to one veto tier predicate
pub struct VetoContext<'a> {
    /// Hostname under investigation
    pub host: &'a str,
    /// All records for the round
    pub records: &'a [EvidenceRecord],
    /// Allow-list in effect
    pub allowlist: &'a AllowList,
}

/// One tier in the ordered veto decision list
pub struct VetoTier {
    /// Stable tier name, reported alongside the score
    pub name: &'static str,
    /// Score this tier pins when it matches
    pub score: u8,
    matches: fn(&VetoContext<'_>) -> bool,
}

/// The ordered decision list; first match wins
///
/// Kept as data rather than a conditional chain so the priority order itself
/// is testable and extensible.
pub static VETO_TIERS: &[VetoTier] = &[
    VetoTier {
        name: "known_safe",
        score: 0,
        matches: |ctx| ctx.allowlist.contains(ctx.host),
    },
    VetoTier {
        name: "critical_veto",
        score: 100,
        matches: |ctx| {
            ctx.records.iter().any(|r| {
                (r.category == EvidenceCategory::BrandImpersonation
                    && r.severity == Severity::Critical
                    && r.confidence >= IMPERSONATION_VETO_CONFIDENCE)
                    || (r.category == EvidenceCategory::ThreatList
                        && r.severity == Severity::Critical)
            })
        },
    },
    VetoTier {
        name: "high_risk",
        score: 75,
        matches: |ctx| {
            let new_domain = ctx.records.iter().any(|r| {
                r.category == EvidenceCategory::DomainAge && r.severity == Severity::Critical
            });
            let free_ca = ctx.records.iter().any(|r| {
                r.category == EvidenceCategory::Certificate
                    && r.metadata.get(FREE_CA_METADATA_KEY).map(String::as_str) == Some("true")
            });
            new_domain && free_ca
        },
    },
    VetoTier {
        name: "seller_failure",
        score: 65,
        matches: |ctx| {
            ctx.records.iter().any(|r| {
                r.category == EvidenceCategory::SellerVerification
                    && r.severity == Severity::Critical
            })
        },
    },
    VetoTier {
        name: "content_warning",
        score: 45,
        matches: |ctx| {
            ctx.records
                .iter()
                .any(|r| r.category == EvidenceCategory::Content && r.severity >= Severity::Warning)
        },
    },
];

/// Outcome of the veto pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VetoOutcome {
    /// Authoritative score in [0, 100]
    pub score: u8,
    /// Name of the tier that decided, or "additive" for the fallback
    pub tier: &'static str,
}

/// Tiered veto score over a completed round
///
/// Walks the ordered tier list; when nothing matches, falls back to the
/// additive formula over the full final set (empty set scores zero).
pub fn veto_score(host: &str, records: &[EvidenceRecord], allowlist: &AllowList) -> VetoOutcome {
    let ctx = VetoContext {
        host,
        records,
        allowlist,
    };
    for tier in VETO_TIERS {
        if (tier.matches)(&ctx) {
            return VetoOutcome {
                score: tier.score,
                tier: tier.name,
            };
        }
    }
    VetoOutcome {
        score: additive_score(records),
        tier: "additive",
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the reported incremental score never leaves [0, 100]
        #[test]
        fn test_incremental_always_clamped(severities in proptest::collection::vec(0usize..4, 0..50)) {
            let all = [Severity::Safe, Severity::Info, Severity::Warning, Severity::Critical];
            let mut score = IncrementalScore::new();
            for idx in severities {
                let reported = score.add(all[idx]);
                prop_assert!(reported <= 100);
            }
        }

        /// Property: the incremental raw total is order-independent
        #[test]
        fn test_incremental_order_independence(mut severities in proptest::collection::vec(0usize..4, 0..20)) {
            let all = [Severity::Safe, Severity::Info, Severity::Warning, Severity::Critical];
            let mut forward = IncrementalScore::new();
            for idx in &severities {
                forward.add(all[*idx]);
            }
            severities.reverse();
            let mut backward = IncrementalScore::new();
            for idx in &severities {
                backward.add(all[*idx]);
            }
            prop_assert_eq!(forward.score(), backward.score());
        }
    }
}
