//! A single cookie and the `Set-Cookie` parser.
//!
//! Parsing handles the attributes that matter for sending the cookie back:
//! `Path`, `Domain` (leading dot stripped), `Secure`, `HttpOnly`, `SameSite`,
//! and keeps `Expires` / `Max-Age` as raw strings. A `Max-Age` of zero or less
//! marks the cookie as a removal.
//!
//! ```rust
//! use minimal_http::cookies::Cookie;
//!
//! let url = "https://example.com/app/login".parse().unwrap();
//! let c = Cookie::parse_set_cookie("session=abc123; Path=/; Secure; HttpOnly", &url).unwrap();
//! assert_eq!(c.name, "session");
//! assert_eq!(c.domain.as_deref(), Some("example.com"));
//! assert!(c.secure && c.http_only);
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Domain scoping. Host-only cookies carry the host they were received from.
    pub domain: Option<String>,

    /// Set when the server sent no `Domain` attribute: the cookie goes back
    /// to exactly that host, never to its subdomains.
    #[serde(default)]
    pub host_only: bool,

    /// Path scoping (e.g., `"/"`).
    pub path: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    pub http_only: bool,

    /// Raw `Expires` attribute, if any. Not enforced.
    pub expires: Option<String>,

    /// Raw `Max-Age` attribute, if any.
    pub max_age: Option<String>,

    /// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
    pub same_site: Option<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            host_only: false,
            path: None,
            secure: false,
            http_only: false,
            expires: None,
            max_age: None,
            same_site: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into().trim_start_matches('.').to_string());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Identity of the cookie inside a jar: name, domain and path.
    pub fn key(&self) -> (&str, &str, &str) {
        (
            self.name.as_str(),
            self.domain.as_deref().unwrap_or_default(),
            self.path.as_deref().unwrap_or("/"),
        )
    }

    pub fn same_key(&self, other: &Cookie) -> bool {
        self.key() == other.key()
    }

    /// A cookie with `Max-Age <= 0` asks for the stored cookie to be dropped.
    pub fn is_removal(&self) -> bool {
        self.max_age
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .is_some_and(|age| age <= 0)
    }

    /// Parses one `Set-Cookie` header value received from `url`.
    pub fn parse_set_cookie(header: &str, url: &Url) -> Option<Cookie> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim());

        for part in parts {
            let part = part.trim();
            if let Some((k, v)) = part.split_once('=') {
                let v = v.trim();
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(v.to_string()),
                    "domain" => cookie.domain = Some(v.trim_start_matches('.').to_ascii_lowercase()),
                    "expires" => cookie.expires = Some(v.to_string()),
                    "max-age" => cookie.max_age = Some(v.to_string()),
                    "samesite" => cookie.same_site = Some(normalize_same_site(v)),
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if part.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            }
        }

        if cookie.domain.is_none() {
            cookie.domain = url.host_str().map(|h| h.to_ascii_lowercase());
            cookie.host_only = true;
        }
        if cookie.path.is_none() {
            cookie.path = Some(default_path(url).to_string());
        }

        Some(cookie)
    }

    /// Whether this cookie should be sent with a request to `url`.
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

        let domain_ok = match &self.domain {
            Some(domain) if self.host_only => host == *domain,
            Some(domain) => host == *domain || host.ends_with(&format!(".{domain}")),
            None => true,
        };
        let path_ok = match &self.path {
            Some(cookie_path) => path_matches(cookie_path, url.path()),
            None => true,
        };
        let secure_ok = !self.secure || url.scheme() == "https";

        domain_ok && path_ok && secure_ok
    }
}

fn normalize_same_site(v: &str) -> String {
    if v.eq_ignore_ascii_case("lax") {
        "Lax".to_string()
    } else if v.eq_ignore_ascii_case("strict") {
        "Strict".to_string()
    } else if v.eq_ignore_ascii_case("none") {
        "None".to_string()
    } else {
        v.to_string()
    }
}

// `/api` covers `/api` and `/api/...`, not `/apiv2`
fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some(rest) => rest.is_empty() || cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

fn default_path(url: &Url) -> &str {
    url.path()
        .rsplit_once('/')
        .map_or("/", |(dir, _)| if dir.is_empty() { "/" } else { dir })
}
