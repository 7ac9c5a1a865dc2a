//! Domain-age producer

use crate::target::{failure_record, ProducerDeps, Target};
use crate::ProducerKind;
use chrono::Utc;
use marlowe_domain::{EvidenceCategory, EvidenceRecord, Severity};
use tracing::debug;

const SOURCE: &str = "whois";

/// Days under which a registration is a strong fraud indicator
pub const CRITICAL_AGE_DAYS: i64 = 30;
/// Days under which a registration is a mild concern
pub const WARNING_AGE_DAYS: i64 = 365;

/// Judge the domain by its registration age
pub async fn run(target: &Target, deps: &ProducerDeps) -> Vec<EvidenceRecord> {
    let record = match deps.whois.lookup(&target.host).await {
        Ok(whois) => match whois.age_days(Utc::now()) {
            Some(age) if age < CRITICAL_AGE_DAYS => EvidenceRecord::new(
                EvidenceCategory::DomainAge,
                Severity::Critical,
                format!("Domain registered {} days ago", age),
                format!(
                    "{} was registered {} days ago; scam storefronts are typically days old",
                    target.host, age
                ),
                SOURCE,
                0.9,
            )
            .with_metadata("age_days", age.to_string()),
            Some(age) if age < WARNING_AGE_DAYS => EvidenceRecord::new(
                EvidenceCategory::DomainAge,
                Severity::Warning,
                "Domain less than a year old",
                format!("{} was registered {} days ago", target.host, age),
                SOURCE,
                0.7,
            )
            .with_metadata("age_days", age.to_string()),
            Some(age) => EvidenceRecord::new(
                EvidenceCategory::DomainAge,
                Severity::Safe,
                "Established domain",
                format!("{} has been registered for {} days", target.host, age),
                SOURCE,
                0.8,
            )
            .with_metadata("age_days", age.to_string()),
            None => EvidenceRecord::new(
                EvidenceCategory::DomainAge,
                Severity::Info,
                "Registration date unavailable",
                format!("WHOIS returned no creation date for {}", target.host),
                SOURCE,
                0.0,
            ),
        },
        Err(e) => {
            debug!(host = %target.host, error = %e, "WHOIS lookup failed");
            failure_record(ProducerKind::DomainAge, SOURCE, &e)
        }
    };
    vec![record]
}
