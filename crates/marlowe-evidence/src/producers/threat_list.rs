//! Threat-list producer

use crate::target::{failure_record, ProducerDeps, Target};
use crate::ProducerKind;
use marlowe_domain::{EvidenceCategory, EvidenceRecord, Severity};
use tracing::debug;

const SOURCE: &str = "threat_db";

/// Confidence carried by a database match
pub const MATCH_CONFIDENCE: f64 = 0.98;

/// Look the host up in the malicious-URL database
pub async fn run(target: &Target, deps: &ProducerDeps) -> Vec<EvidenceRecord> {
    let record = match deps.threat.check(&target.host).await {
        Ok(hit) if hit.listed => {
            let threat = hit.threat_type.as_deref().unwrap_or("malicious activity");
            let mut record = EvidenceRecord::new(
                EvidenceCategory::ThreatList,
                Severity::Critical,
                format!("Listed for {}", threat),
                format!(
                    "{} appears in the malicious-URL database, flagged for {}",
                    target.host, threat
                ),
                SOURCE,
                MATCH_CONFIDENCE,
            );
            if let Some(reference) = hit.reference {
                record = record.with_metadata("reference", reference);
            }
            record
        }
        Ok(_) => EvidenceRecord::new(
            EvidenceCategory::ThreatList,
            Severity::Safe,
            "Not on any threat list",
            format!("{} has no entry in the malicious-URL database", target.host),
            SOURCE,
            0.8,
        ),
        Err(e) => {
            debug!(host = %target.host, error = %e, "Threat-list lookup failed");
            failure_record(ProducerKind::ThreatList, SOURCE, &e)
        }
    };
    vec![record]
}
