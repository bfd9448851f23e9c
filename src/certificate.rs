//! Snapshot of a peer's TLS leaf certificate.
//!
//! The client captures the certificate presented during the handshake, hands
//! it to the validation callback and attaches it to the [`Response`](crate::Response).
//! All queries are pure; nothing here talks to the network.

use crate::errors::{HttpError, Result};
use std::fmt;
use std::sync::Arc;
use time::OffsetDateTime;
use x509_parser::pem::parse_x509_pem;

/// Caller-supplied certificate validation strategy.
///
/// Invoked at most once per handshake, synchronously on the handshake path,
/// so it must not block for long. Returning `false` aborts the connection.
pub type CertificateValidator = Arc<dyn Fn(&Certificate) -> bool + Send + Sync>;

#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    public_key: Vec<u8>,
    subject: String,
    issuer: String,
    serial: String,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
}

impl Certificate {
    /// Parses a DER encoded X.509 certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        if der.is_empty() {
            return Err(HttpError::MissingArgument("certificate"));
        }

        let (_, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| HttpError::Certificate(e.to_string()))?;

        let validity = cert.validity();
        Ok(Self {
            der: der.to_vec(),
            public_key: cert.public_key().subject_public_key.data.to_vec(),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: cert.raw_serial_as_string(),
            not_before: validity.not_before.to_datetime(),
            not_after: validity.not_after.to_datetime(),
        })
    }

    /// Parses the first certificate of a PEM document.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        if pem.is_empty() {
            return Err(HttpError::MissingArgument("certificate"));
        }

        let (_, pem) = parse_x509_pem(pem).map_err(|e| HttpError::Certificate(e.to_string()))?;
        Self::from_der(&pem.contents)
    }

    /// True when the current time lies outside `[not_before, not_after]`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now < self.not_before || now > self.not_after
    }

    /// Compares the subject public key bits with `key`.
    pub fn compare_public_key(&self, key: &[u8]) -> Result<bool> {
        if key.is_empty() {
            return Err(HttpError::MissingArgument("key"));
        }
        Ok(self.public_key == key)
    }

    /// Compares the raw DER encoding with `raw`.
    pub fn matches_der(&self, raw: &[u8]) -> bool {
        !raw.is_empty() && self.der == raw
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("serial", &self.serial)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const VALID_DER: &[u8] = include_bytes!("../tests/fixtures/valid.der");
    const VALID_PEM: &[u8] = include_bytes!("../tests/fixtures/valid.pem");
    const VALID_KEY: &[u8] = include_bytes!("../tests/fixtures/valid_public_key.bin");
    const EXPIRED_DER: &[u8] = include_bytes!("../tests/fixtures/expired.der");

    #[test]
    fn parses_validity_window() {
        let cert = Certificate::from_der(VALID_DER).unwrap();
        assert_eq!(cert.not_before(), datetime!(2024-01-01 00:00:00 UTC));
        assert_eq!(cert.not_after(), datetime!(2099-12-31 23:59:59 UTC));
        assert!(cert.subject().contains("localhost"));
    }

    #[test]
    fn expiry_checks_both_ends_of_the_window() {
        let cert = Certificate::from_der(VALID_DER).unwrap();
        assert!(!cert.is_expired());
        assert!(cert.is_expired_at(datetime!(2023-06-01 00:00:00 UTC)));
        assert!(cert.is_expired_at(datetime!(2100-01-01 00:00:00 UTC)));

        let old = Certificate::from_der(EXPIRED_DER).unwrap();
        assert!(old.is_expired());
    }

    #[test]
    fn pem_and_der_give_the_same_certificate() {
        let a = Certificate::from_der(VALID_DER).unwrap();
        let b = Certificate::from_pem(VALID_PEM).unwrap();
        assert_eq!(a, b);
        assert!(a.matches_der(VALID_DER));
        assert!(!a.matches_der(EXPIRED_DER));
        assert!(!a.matches_der(&[]));
    }

    #[test]
    fn different_certificates_are_not_equal() {
        let a = Certificate::from_der(VALID_DER).unwrap();
        let b = Certificate::from_der(EXPIRED_DER).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn public_key_comparison() {
        let cert = Certificate::from_der(VALID_DER).unwrap();
        assert!(cert.compare_public_key(VALID_KEY).unwrap());
        assert!(!cert.compare_public_key(&[0x04, 0x01]).unwrap());
        assert!(matches!(cert.compare_public_key(&[]), Err(HttpError::MissingArgument("key"))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(Certificate::from_der(&[]), Err(HttpError::MissingArgument(_))));
        assert!(matches!(Certificate::from_der(b"not a cert"), Err(HttpError::Certificate(_))));
    }
}
