//! Raw-TLS certificate introspection
//!
//! Performs a real handshake on port 443 and reads the peer's leaf
//! certificate. Verification is deliberately permissive: the point is to
//! inspect bad certificates, not to refuse them.

use crate::error::ProbeError;
use chrono::{DateTime, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use x509_parser::prelude::*;

/// Free/automated certificate authorities
///
/// Matched case-insensitively against the issuer name. Presence here is a
/// scoring input, not a judgment on the CA itself.
static FREE_CA_ISSUERS: &[&str] = &[
    "let's encrypt",
    "lets encrypt",
    "zerossl",
    "cpanel",
    "buypass go",
    "actalis",
    "ssl.com free",
];

/// What the handshake revealed about a host's certificate
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateInfo {
    /// Issuer distinguished name
    pub issuer: String,
    /// Subject distinguished name
    pub subject: String,
    /// Issuer and subject are identical
    pub self_signed: bool,
    /// Whole days until expiry; negative means already expired
    pub days_until_expiry: i64,
    /// Issuer matches a known free/automated CA
    pub issuer_is_free_ca: bool,
}

/// TLS handshake-based certificate inspector
pub struct CertificateInspector {
    connector: TlsConnector,
    handshake_timeout: Duration,
}

impl CertificateInspector {
    /// Create an inspector with the given handshake timeout
    pub fn new(handshake_timeout: Duration) -> Self {
        let config = rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
            .with_no_client_auth();
        Self {
            connector: TlsConnector::from(Arc::new(config)),
            handshake_timeout,
        }
    }

    /// Handshake with `host:443` and inspect the leaf certificate
    ///
    /// DNS failure, connection refusal, and handshake timeout each surface
    /// as their own `ProbeError` variant so the producer can distinguish a
    /// dead domain from an unencrypted one.
    pub async fn inspect(&self, host: &str) -> Result<CertificateInfo, ProbeError> {
        self.inspect_at(host, Utc::now()).await
    }

    /// `inspect`, with an explicit "now" for deterministic expiry math
    pub async fn inspect_at(
        &self,
        host: &str,
        now: DateTime<Utc>,
    ) -> Result<CertificateInfo, ProbeError> {
        let addr = format!("{}:443", host);
        let mut addrs = tokio::net::lookup_host(&addr)
            .await
            .map_err(|e| ProbeError::Dns(e.to_string()))?;
        let addr = addrs
            .next()
            .ok_or_else(|| ProbeError::Dns(format!("{} resolved to nothing", host)))?;

        let tcp = timeout(self.handshake_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(ProbeError::from_io)?;

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| ProbeError::Tls(format!("Invalid server name: {}", e)))?;

        let stream = timeout(self.handshake_timeout, self.connector.connect(server_name, tcp))
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| ProbeError::Tls(e.to_string()))?;

        let (_, connection) = stream.get_ref();
        let leaf = connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| ProbeError::Tls("Peer presented no certificate".to_string()))?;

        parse_leaf(leaf.as_ref(), now)
    }
}

/// Parse the DER-encoded leaf certificate into `CertificateInfo`
fn parse_leaf(der: &[u8], now: DateTime<Utc>) -> Result<CertificateInfo, ProbeError> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| ProbeError::Parse(format!("Certificate parse failed: {}", e)))?;

    let issuer = cert.issuer().to_string();
    let subject = cert.subject().to_string();
    let self_signed = issuer == subject;

    let not_after = cert.validity().not_after.timestamp();
    let days_until_expiry = (not_after - now.timestamp()) / 86_400;

    let issuer_lower = issuer.to_lowercase();
    let issuer_is_free_ca = FREE_CA_ISSUERS.iter().any(|ca| issuer_lower.contains(ca));

    Ok(CertificateInfo {
        issuer,
        subject,
        self_signed,
        days_until_expiry,
        issuer_is_free_ca,
    })
}

/// Accepts every certificate so the handshake always completes
#[derive(Debug)]
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
