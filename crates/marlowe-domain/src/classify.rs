//! Failure classification
//!
//! Maps a failed I/O call to a {severity, suspicious} signal so that
//! infrastructure noise is never mistaken for a fraud signal. Producers
//! convert every classified failure into a low-confidence evidence record
//! instead of raising.

use crate::evidence::Severity;

/// Closed taxonomy of ways an external lookup can fail
///
/// Infrastructure crates map their transport errors into this before asking
/// for a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The hostname does not resolve
    DnsResolution,
    /// TCP connection actively refused
    ConnectionRefused,
    /// The call timed out or was aborted
    Timeout,
    /// The server answered with an HTTP status
    HttpStatus(u16),
    /// Credential rejected or permission denied
    AuthDenied,
    /// The response arrived but could not be understood
    MalformedResponse,
    /// Anything else
    Other,
}

/// Result of classifying a failure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Severity the resulting evidence record should carry
    pub severity: Severity,
    /// Whether the failure itself is a weak fraud signal
    pub suspicious: bool,
}

impl Classification {
    /// Confidence for the resulting record: suspicious failures are a weak
    /// signal, everything else carries none.
    pub fn confidence(&self) -> f64 {
        if self.suspicious {
            0.3
        } else {
            0.0
        }
    }
}

/// Classify a failure, rules applied in order
///
/// A nonexistent site is not an active threat, so a resolution failure is
/// affirmatively safe. Auth failures are operator misconfiguration and must
/// never read as fraud. Timeouts and 5xx are weak signals of an overloaded
/// or stalling server.
pub fn classify(kind: &FailureKind) -> Classification {
    match kind {
        FailureKind::DnsResolution => Classification {
            severity: Severity::Safe,
            suspicious: false,
        },
        FailureKind::ConnectionRefused => Classification {
            severity: Severity::Info,
            suspicious: false,
        },
        FailureKind::Timeout => Classification {
            severity: Severity::Info,
            suspicious: true,
        },
        FailureKind::HttpStatus(status) if *status >= 500 => Classification {
            severity: Severity::Info,
            suspicious: true,
        },
        FailureKind::AuthDenied | FailureKind::HttpStatus(401) | FailureKind::HttpStatus(403) => {
            Classification {
                severity: Severity::Info,
                suspicious: false,
            }
        }
        _ => Classification {
            severity: Severity::Info,
            suspicious: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_failure_is_safe_not_suspicious() {
        let c = classify(&FailureKind::DnsResolution);
        assert_eq!(c.severity, Severity::Safe);
        assert!(!c.suspicious);
        assert_eq!(c.confidence(), 0.0);
    }

    #[test]
    fn test_connection_refused_is_info() {
        let c = classify(&FailureKind::ConnectionRefused);
        assert_eq!(c.severity, Severity::Info);
        assert!(!c.suspicious);
    }

    #[test]
    fn test_timeout_is_weakly_suspicious() {
        let c = classify(&FailureKind::Timeout);
        assert_eq!(c.severity, Severity::Info);
        assert!(c.suspicious);
        assert_eq!(c.confidence(), 0.3);
    }

    #[test]
    fn test_server_errors_are_weakly_suspicious() {
        for status in [500, 502, 503] {
            let c = classify(&FailureKind::HttpStatus(status));
            assert_eq!(c.severity, Severity::Info);
            assert!(c.suspicious, "HTTP {} should be suspicious", status);
        }
    }

    #[test]
    fn test_auth_failures_never_read_as_fraud() {
        for kind in [
            FailureKind::AuthDenied,
            FailureKind::HttpStatus(401),
            FailureKind::HttpStatus(403),
        ] {
            let c = classify(&kind);
            assert_eq!(c.severity, Severity::Info);
            assert!(!c.suspicious);
        }
    }

    #[test]
    fn test_default_is_neutral_info() {
        for kind in [
            FailureKind::MalformedResponse,
            FailureKind::Other,
            FailureKind::HttpStatus(404),
        ] {
            let c = classify(&kind);
            assert_eq!(c.severity, Severity::Info);
            assert!(!c.suspicious);
        }
    }
}
