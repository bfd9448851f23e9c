//! Server certificate validation.
//!
//! Every request builds its own rustls config around a [`ValidationHook`].
//! The hook runs the regular webpki verification first, classifies the
//! outcome as [`PolicyErrors`] and then asks [`accept_certificate`] whether
//! the handshake may continue. The leaf certificate is recorded so it can be
//! attached to the response.

use crate::certificate::{Certificate, CertificateValidator};
use crate::config::ClientConfig;
use crate::errors::{HttpError, Result};
use lazy_static::lazy_static;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

lazy_static! {
    static ref ROOTS: Arc<RootCertStore> = Arc::new(RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    });
}

/// What the platform verifier found wrong with the presented certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyErrors {
    None,
    CertificateNotAvailable,
    NameMismatch,
    ChainErrors,
}

impl PolicyErrors {
    fn from_verification(result: &std::result::Result<ServerCertVerified, rustls::Error>) -> Self {
        match result {
            Ok(_) => PolicyErrors::None,
            Err(rustls::Error::InvalidCertificate(
                CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. },
            )) => PolicyErrors::NameMismatch,
            Err(rustls::Error::NoCertificatesPresented) => PolicyErrors::CertificateNotAvailable,
            Err(_) => PolicyErrors::ChainErrors,
        }
    }
}

/// Decides whether a handshake may proceed.
///
/// Invalid certificates are accepted outright when `allow_invalid` is set.
/// A clean verification (or no certificate at all) is accepted. Otherwise
/// the callback decides alone when one is installed; without a callback the
/// certificate must be unexpired and the chain must verify, so a bare name
/// mismatch on an otherwise valid certificate still passes.
pub fn accept_certificate(
    policy: PolicyErrors,
    allow_invalid: bool,
    validator: Option<&CertificateValidator>,
    certificate: Option<&Certificate>,
) -> bool {
    if allow_invalid {
        return true;
    }
    if matches!(policy, PolicyErrors::None | PolicyErrors::CertificateNotAvailable) {
        return true;
    }

    let Some(certificate) = certificate else {
        return false;
    };
    match validator {
        Some(validator) => validator(certificate),
        None => !certificate.is_expired() && policy != PolicyErrors::ChainErrors,
    }
}

/// What happened during the handshake of one request.
#[derive(Debug, Default)]
pub(crate) struct HandshakeRecord {
    certificate: Mutex<Option<Certificate>>,
    rejected: AtomicBool,
}

impl HandshakeRecord {
    pub(crate) fn certificate(&self) -> Option<Certificate> {
        self.certificate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The recorded certificate, if it belongs to a response from `url`.
    ///
    /// A redirect from https to plain http leaves the certificate of an
    /// earlier hop behind; it is not reported for the final response.
    pub(crate) fn certificate_for(&self, url: &Url) -> Option<Certificate> {
        if url.scheme() != "https" {
            return None;
        }
        self.certificate()
    }

    pub(crate) fn was_rejected(&self) -> bool {
        self.rejected.load(Ordering::SeqCst)
    }

    fn observe(&self, certificate: Option<Certificate>) {
        *self.certificate.lock().unwrap_or_else(PoisonError::into_inner) = certificate;
    }

    fn reject(&self) {
        self.rejected.store(true, Ordering::SeqCst);
    }
}

pub(crate) struct ValidationHook {
    platform: Arc<WebPkiServerVerifier>,
    allow_invalid: bool,
    validator: Option<CertificateValidator>,
    record: Arc<HandshakeRecord>,
}

impl fmt::Debug for ValidationHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationHook")
            .field("allow_invalid", &self.allow_invalid)
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

impl ValidationHook {
    fn new(
        roots: Arc<RootCertStore>,
        provider: Arc<CryptoProvider>,
        config: &ClientConfig,
        record: Arc<HandshakeRecord>,
    ) -> Result<Self> {
        let platform = WebPkiServerVerifier::builder_with_provider(roots, provider)
            .build()
            .map_err(|e| HttpError::Tls(e.to_string()))?;

        Ok(Self {
            platform,
            allow_invalid: config.allow_invalid_certificates,
            validator: config.certificate_validator.clone(),
            record,
        })
    }
}

impl ServerCertVerifier for ValidationHook {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let verdict = self.platform.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        );
        let policy = PolicyErrors::from_verification(&verdict);
        if let Err(e) = &verdict {
            log::debug!("certificate for {server_name:?} did not verify: {e}");
        }

        let certificate = match Certificate::from_der(end_entity.as_ref()) {
            Ok(c) => Some(c),
            Err(e) => {
                log::debug!("could not parse certificate for {server_name:?}: {e}");
                None
            }
        };

        let accepted = accept_certificate(
            policy,
            self.allow_invalid,
            self.validator.as_ref(),
            certificate.as_ref(),
        );
        self.record.observe(certificate);

        if accepted {
            Ok(ServerCertVerified::assertion())
        } else {
            log::warn!("rejected certificate for {server_name:?} ({policy:?})");
            self.record.reject();
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.platform.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.platform.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.platform.supported_verify_schemes()
    }
}

/// Builds the TLS config for one request, reporting into `record`.
pub(crate) fn client_tls_config(
    config: &ClientConfig,
    record: Arc<HandshakeRecord>,
) -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let hook = ValidationHook::new(ROOTS.clone(), provider.clone(), config, record)?;

    let tls = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(hook))
        .with_no_client_auth();
    Ok(tls)
}
