//! Upstream proxy descriptor.
//!
//! A [`Proxy`] is only a description; nothing touches the network until the
//! client builds a request with it.

use crate::errors::{HttpError, Result};

/// Port value meaning "use the scheme default".
pub const DEFAULT_PORT: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    address: String,
    port: i32,
    username: Option<String>,
    password: Option<String>,
}

impl Default for Proxy {
    fn default() -> Self {
        Self::none()
    }
}

impl Proxy {
    /// An empty proxy: requests go direct.
    pub fn none() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
        }
    }

    /// Proxy at `address` with an optional port (`-1` for the default port).
    pub fn new(address: impl Into<String>, port: i32) -> Result<Self> {
        let address = address.into();
        if address.is_empty() {
            return Err(HttpError::MissingArgument("address"));
        }
        if !(DEFAULT_PORT..=i32::from(u16::MAX)).contains(&port) {
            return Err(HttpError::OutOfRange("port"));
        }

        Ok(Self {
            address,
            port,
            username: None,
            password: None,
        })
    }

    /// Proxy with credentials. Empty username or password are stored but do
    /// not count as credentials.
    pub fn with_credentials(
        address: impl Into<String>,
        port: i32,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let mut proxy = Self::new(address, port)?;
        proxy.username = Some(username.into());
        proxy.password = Some(password.into());
        Ok(proxy)
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }

    pub fn has_proxy(&self) -> bool {
        !self.is_empty()
    }

    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.username, &self.password),
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty()
        )
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> i32 {
        self.port
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Proxy URL as handed to the transport. Bare host names default to `http://`.
    pub fn url(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let base = if self.address.contains("://") {
            self.address.clone()
        } else {
            format!("http://{}", self.address)
        };

        if self.port > 0 {
            Some(format!("{}:{}", base.trim_end_matches('/'), self.port))
        } else {
            Some(base)
        }
    }

    pub(crate) fn to_reqwest(&self) -> Result<Option<reqwest::Proxy>> {
        let Some(url) = self.url() else {
            return Ok(None);
        };

        let mut proxy = reqwest::Proxy::all(url.as_str())?;
        if self.has_credentials() {
            proxy = proxy.basic_auth(
                self.username.as_deref().unwrap_or_default(),
                self.password.as_deref().unwrap_or_default(),
            );
        }
        Ok(Some(proxy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_proxy_has_nothing() {
        let p = Proxy::none();
        assert!(p.is_empty());
        assert!(!p.has_proxy());
        assert!(!p.has_credentials());
        assert_eq!(p.port(), DEFAULT_PORT);
        assert!(p.url().is_none());
        assert!(p.to_reqwest().unwrap().is_none());
    }

    #[test]
    fn address_is_required() {
        assert!(matches!(Proxy::new("", 8080), Err(HttpError::MissingArgument("address"))));
    }

    #[test]
    fn port_range_is_checked() {
        assert!(Proxy::new("proxy.local", -1).is_ok());
        assert!(Proxy::new("proxy.local", 65535).is_ok());
        assert!(matches!(Proxy::new("proxy.local", -2), Err(HttpError::OutOfRange("port"))));
        assert!(matches!(Proxy::new("proxy.local", 65536), Err(HttpError::OutOfRange("port"))));
    }

    #[test]
    fn credentials_need_both_parts() {
        let p = Proxy::with_credentials("proxy.local", 3128, "user", "").unwrap();
        assert!(p.has_proxy());
        assert!(!p.has_credentials());

        let p = Proxy::with_credentials("proxy.local", 3128, "user", "secret").unwrap();
        assert!(p.has_credentials());
        assert_eq!(p.username(), Some("user"));
    }

    #[test]
    fn url_includes_scheme_and_port() {
        assert_eq!(Proxy::new("proxy.local", 3128).unwrap().url().unwrap(), "http://proxy.local:3128");
        assert_eq!(Proxy::new("socks5://10.0.0.1", -1).unwrap().url().unwrap(), "socks5://10.0.0.1");
        assert!(Proxy::new("proxy.local", 0).unwrap().to_reqwest().unwrap().is_some());
    }
}
