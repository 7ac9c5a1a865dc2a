//! Error types for lookup clients

use marlowe_domain::FailureKind;
use thiserror::Error;

/// Errors that can occur while probing an external source
///
/// Each variant maps onto the domain failure taxonomy so producers can
/// classify a failed probe instead of propagating it.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Hostname did not resolve
    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// TCP connection actively refused
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    /// The call exceeded its bounded timeout
    #[error("Probe timed out")]
    Timeout,

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Credential rejected
    #[error("Authentication rejected: {0}")]
    Auth(String),

    /// TLS handshake failed
    #[error("TLS handshake failed: {0}")]
    Tls(String),

    /// Response arrived but could not be parsed
    #[error("Malformed response: {0}")]
    Parse(String),

    /// Anything else
    #[error("Probe failed: {0}")]
    Other(String),
}

impl ProbeError {
    /// Map onto the domain failure taxonomy for classification
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ProbeError::Dns(_) => FailureKind::DnsResolution,
            ProbeError::ConnectionRefused(_) => FailureKind::ConnectionRefused,
            ProbeError::Timeout => FailureKind::Timeout,
            ProbeError::Status(code) => FailureKind::HttpStatus(*code),
            ProbeError::Auth(_) => FailureKind::AuthDenied,
            ProbeError::Parse(_) => FailureKind::MalformedResponse,
            ProbeError::Tls(_) | ProbeError::Other(_) => FailureKind::Other,
        }
    }

    /// Normalize a reqwest transport error
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProbeError::Timeout;
        }
        if let Some(status) = e.status() {
            return ProbeError::Status(status.as_u16());
        }
        // reqwest surfaces resolution and connection failures as opaque
        // connect errors; sniff the source chain to keep the taxonomy honest.
        let text = format!("{:?}", e);
        let lowered = text.to_lowercase();
        if e.is_connect() {
            if lowered.contains("dns") || lowered.contains("resolve") {
                return ProbeError::Dns(e.to_string());
            }
            if lowered.contains("refused") {
                return ProbeError::ConnectionRefused(e.to_string());
            }
        }
        ProbeError::Other(e.to_string())
    }

    /// Normalize an I/O error from a raw socket
    pub fn from_io(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::ConnectionRefused => ProbeError::ConnectionRefused(e.to_string()),
            std::io::ErrorKind::TimedOut => ProbeError::Timeout,
            _ => ProbeError::Other(e.to_string()),
        }
    }
}

/// Reject non-success statuses, folding auth failures into their own variant
pub(crate) fn check_status(response: &reqwest::Response) -> Result<(), ProbeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProbeError::Auth(format!("HTTP {}", status)));
    }
    Err(ProbeError::Status(status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlowe_domain::{classify, Severity};

    #[test]
    fn test_failure_kind_mapping() {
        assert_eq!(
            ProbeError::Dns("x".into()).failure_kind(),
            FailureKind::DnsResolution
        );
        assert_eq!(ProbeError::Timeout.failure_kind(), FailureKind::Timeout);
        assert_eq!(
            ProbeError::Status(503).failure_kind(),
            FailureKind::HttpStatus(503)
        );
        assert_eq!(
            ProbeError::Auth("denied".into()).failure_kind(),
            FailureKind::AuthDenied
        );
    }

    #[test]
    fn test_dns_probe_classifies_safe() {
        let kind = ProbeError::Dns("no such host".into()).failure_kind();
        let c = classify(&kind);
        assert_eq!(c.severity, Severity::Safe);
        assert_eq!(c.confidence(), 0.0);
    }

    #[test]
    fn test_io_error_mapping() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            ProbeError::from_io(refused),
            ProbeError::ConnectionRefused(_)
        ));

        let timed_out = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert!(matches!(ProbeError::from_io(timed_out), ProbeError::Timeout));
    }
}
