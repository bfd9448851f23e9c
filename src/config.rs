//! Client configuration.
//!
//! `ClientConfig` holds every per-client setting that shapes outgoing
//! requests: identity (user agent), timing, redirect and caching behavior,
//! the proxy, the text encoding and the TLS validation policy.
//!
//! `ClientConfig` provides sensible defaults via [`Default`] and a fluent
//! [`ClientConfig::builder()`] for customization with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use minimal_http::ClientConfig;
//! let cfg = ClientConfig::default();
//! assert_eq!(cfg.timeout.as_secs(), 300);
//! assert!(cfg.follow_redirects);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use minimal_http::ClientConfig;
//! use std::time::Duration;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ClientConfig::builder()
//!     .user_agent("minimal-http/0.1")
//!     .timeout(Duration::from_secs(10))
//!     .follow_redirects(false)
//!     .encoding("iso-8859-1")
//!     .build()?; // returns Result<ClientConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`ConfigError`] for a zero timeout, an unknown
//! encoding label, redirects enabled with a zero redirect limit, or an empty
//! host override.

use crate::certificate::{Certificate, CertificateValidator};
use crate::proxy::Proxy;
use encoding_rs::Encoding;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:58.0) Gecko/20100101 Firefox/58.0";

/// Default request timeout, matching Apache's default server timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_MAX_REDIRECTS: usize = 50;

#[derive(Clone)]
pub struct ClientConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Timeout applied to each request as a whole
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    /// Keep the connection open after the response (sends `Connection: close` otherwise)
    pub keep_alive: bool,
    /// Ask intermediaries not to serve or store cached responses
    pub disable_caching: bool,
    /// Send the next requests without a `Referer`
    pub clear_referer: bool,
    /// Accept any server certificate
    pub allow_invalid_certificates: bool,
    /// Explicit `Host` header override
    pub host: Option<String>,
    pub proxy: Proxy,
    /// Encoding for text request bodies and response bodies
    pub encoding: &'static Encoding,
    /// Consulted when the platform verifier finds problems with the server certificate
    pub certificate_validator: Option<CertificateValidator>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            keep_alive: false,
            disable_caching: false,
            clear_referer: false,
            allow_invalid_certificates: false,
            host: None,
            proxy: Proxy::none(),
            encoding: encoding_rs::UTF_8,
            certificate_validator: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("follow_redirects", &self.follow_redirects)
            .field("max_redirects", &self.max_redirects)
            .field("keep_alive", &self.keep_alive)
            .field("disable_caching", &self.disable_caching)
            .field("clear_referer", &self.clear_referer)
            .field("allow_invalid_certificates", &self.allow_invalid_certificates)
            .field("host", &self.host)
            .field("proxy", &self.proxy)
            .field("encoding", &self.encoding.name())
            .field("certificate_validator", &self.certificate_validator.is_some())
            .finish()
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn has_proxy(&self) -> bool {
        self.proxy.has_proxy()
    }

    /// Installs a certificate validation callback.
    pub fn set_certificate_validator<F>(&mut self, f: F)
    where
        F: Fn(&Certificate) -> bool + Send + Sync + 'static,
    {
        self.certificate_validator = Some(Arc::new(f));
    }

    /// Looks up an encoding by its WHATWG label (`"utf-8"`, `"latin1"`, ...).
    pub fn set_encoding(&mut self, label: &str) -> Result<(), ConfigError> {
        self.encoding = lookup_encoding(label)?;
        Ok(())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    inner: ClientConfig,
    encoding_label: Option<String>,
}

impl ClientConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ClientConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn timeout(self, timeout: Duration) -> Self { self.map(|c| c.timeout = timeout) }
    pub fn follow_redirects(self, on: bool) -> Self { self.map(|c| c.follow_redirects = on) }
    pub fn max_redirects(self, n: usize) -> Self { self.map(|c| c.max_redirects = n) }
    pub fn keep_alive(self, on: bool) -> Self { self.map(|c| c.keep_alive = on) }
    pub fn disable_caching(self, on: bool) -> Self { self.map(|c| c.disable_caching = on) }
    pub fn clear_referer(self, on: bool) -> Self { self.map(|c| c.clear_referer = on) }
    pub fn allow_invalid_certificates(self, on: bool) -> Self { self.map(|c| c.allow_invalid_certificates = on) }
    pub fn host<S: Into<String>>(self, host: S) -> Self { self.map(|c| c.host = Some(host.into())) }
    pub fn proxy(self, proxy: Proxy) -> Self { self.map(|c| c.proxy = proxy) }

    pub fn certificate_validator<F>(self, f: F) -> Self
    where
        F: Fn(&Certificate) -> bool + Send + Sync + 'static,
    {
        self.map(|c| c.set_certificate_validator(f))
    }

    /// Encoding label, resolved when the config is built.
    pub fn encoding<S: Into<String>>(mut self, label: S) -> Self {
        self.encoding_label = Some(label.into());
        self
    }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ClientConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(mut self) -> Result<ClientConfig, ConfigError> {
        if let Some(label) = self.encoding_label.take() {
            self.inner.encoding = lookup_encoding(&label)?;
        }
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTimeout,
    UnknownEncoding(String),
    ZeroRedirects,
    EmptyHost,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTimeout =>
                write!(f, "timeout must be greater than zero"),
            ConfigError::UnknownEncoding(label) =>
                write!(f, "unknown encoding label '{label}'"),
            ConfigError::ZeroRedirects =>
                write!(f, "max_redirects must be at least 1 when following redirects"),
            ConfigError::EmptyHost =>
                write!(f, "host override must not be empty"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn lookup_encoding(label: &str) -> Result<&'static Encoding, ConfigError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))
}

fn validate(c: &ClientConfig) -> Result<(), ConfigError> {
    if c.timeout.is_zero() {
        return Err(ConfigError::ZeroTimeout);
    }
    if c.follow_redirects && c.max_redirects == 0 {
        return Err(ConfigError::ZeroRedirects);
    }
    if matches!(&c.host, Some(h) if h.trim().is_empty()) {
        return Err(ConfigError::EmptyHost);
    }
    Ok(())
}
