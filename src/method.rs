//! Request methods understood by the client.
//!
//! Conversions in both directions go through a single lookup table, so the
//! canonical spelling of a method lives in exactly one place.

use std::fmt;
use std::str::FromStr;

/// HTTP request method.
///
/// `Unknown` is the sentinel for unrecognized method strings and is never
/// sent. `Connect` can be named and parsed but is refused by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestMethod {
    #[default]
    Unknown,
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

const METHOD_TABLE: [(RequestMethod, &str); 10] = [
    (RequestMethod::Unknown, "UNKNOWN"),
    (RequestMethod::Get, "GET"),
    (RequestMethod::Head, "HEAD"),
    (RequestMethod::Post, "POST"),
    (RequestMethod::Put, "PUT"),
    (RequestMethod::Delete, "DELETE"),
    (RequestMethod::Connect, "CONNECT"),
    (RequestMethod::Options, "OPTIONS"),
    (RequestMethod::Trace, "TRACE"),
    (RequestMethod::Patch, "PATCH"),
];

impl RequestMethod {
    /// Canonical upper-case name of the method.
    pub fn as_str(&self) -> &'static str {
        METHOD_TABLE
            .iter()
            .find(|(m, _)| m == self)
            .map(|(_, s)| *s)
            .unwrap_or("UNKNOWN")
    }

    /// Case-insensitive lookup. Anything not in the table maps to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        METHOD_TABLE
            .iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(name.trim()))
            .map(|(m, _)| *m)
            .unwrap_or(RequestMethod::Unknown)
    }

    /// True if the client is willing to put this method on the wire.
    pub fn is_executable(&self) -> bool {
        !matches!(self, RequestMethod::Unknown | RequestMethod::Connect)
    }

    /// Methods that carry a request body in this client.
    pub fn has_body(&self) -> bool {
        matches!(self, RequestMethod::Post | RequestMethod::Put | RequestMethod::Patch)
    }

    pub(crate) fn to_http(self) -> Option<http::Method> {
        if self == RequestMethod::Unknown {
            return None;
        }
        http::Method::from_bytes(self.as_str().as_bytes()).ok()
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RequestMethod::from_name(s))
    }
}

impl From<&http::Method> for RequestMethod {
    fn from(method: &http::Method) -> Self {
        RequestMethod::from_name(method.as_str())
    }
}
