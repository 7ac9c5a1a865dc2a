//! Certificate producer

use crate::target::{failure_record, ProducerDeps, Target};
use crate::ProducerKind;
use marlowe_domain::{EvidenceCategory, EvidenceRecord, Severity};
use marlowe_intel::{CertificateInfo, ProbeError};
use tracing::debug;

const SOURCE: &str = "tls";

/// Days of remaining validity under which expiry becomes a warning
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// Judge the site by its TLS certificate
pub async fn run(target: &Target, deps: &ProducerDeps) -> Vec<EvidenceRecord> {
    let record = match deps.cert.inspect(&target.host).await {
        Ok(info) => judge(&target.host, &info),
        // A refused 443 means the site serves traffic unencrypted; that is a
        // finding, not an infrastructure failure.
        Err(ProbeError::ConnectionRefused(_)) => EvidenceRecord::new(
            EvidenceCategory::Certificate,
            Severity::Critical,
            "Connection not encrypted",
            format!("{} does not accept TLS connections on port 443", target.host),
            SOURCE,
            0.85,
        ),
        Err(e) => {
            debug!(host = %target.host, error = %e, "Certificate inspection failed");
            failure_record(ProducerKind::Certificate, SOURCE, &e)
        }
    };
    vec![record]
}

fn judge(host: &str, info: &CertificateInfo) -> EvidenceRecord {
    let base = |severity, title: String, detail: String, confidence| {
        EvidenceRecord::new(
            EvidenceCategory::Certificate,
            severity,
            title,
            detail,
            SOURCE,
            confidence,
        )
        .with_metadata("issuer", info.issuer.clone())
        .with_metadata(
            marlowe_domain::scoring::FREE_CA_METADATA_KEY,
            info.issuer_is_free_ca.to_string(),
        )
    };

    if info.self_signed {
        return base(
            Severity::Critical,
            "Self-signed certificate".to_string(),
            format!("{} presents a certificate it issued to itself", host),
            0.9,
        );
    }
    if info.days_until_expiry < 0 {
        return base(
            Severity::Critical,
            "Expired certificate".to_string(),
            format!(
                "Certificate for {} expired {} days ago",
                host,
                -info.days_until_expiry
            ),
            0.9,
        );
    }
    if info.days_until_expiry < EXPIRY_WARNING_DAYS {
        return base(
            Severity::Warning,
            "Certificate expiring soon".to_string(),
            format!(
                "Certificate for {} expires in {} days",
                host, info.days_until_expiry
            ),
            0.6,
        );
    }
    base(
        Severity::Safe,
        "Valid certificate".to_string(),
        format!("Certificate issued by {}", info.issuer),
        0.8,
    )
}
