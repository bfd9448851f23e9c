//! Buffered HTTP response model.
//!
//! A [`Response`] is produced for every request that reached the transport,
//! including requests the server answered with a 4xx/5xx status. It carries
//! the status, the metadata of the final hop (after redirects), the headers
//! in the order they were received, the cookies the server set during the
//! exchange, the peer certificate for TLS connections and the body decoded
//! into text.
//!
//! ## Notes
//! - The body is decoded with the client's configured encoding. A byte order
//!   mark in the body overrides it.
//! - Reading the body is best effort: a failure while reading leaves an empty
//!   body and is only logged.
//! - `status_text` is derived from the status code's canonical reason phrase
//!   and is `"Unknown"` for non-standard codes.
//! - A response counts as successful only when no transport failure was
//!   recorded and the status lies in `200..=399`.

use crate::certificate::Certificate;
use crate::cookies::Cookie;
use crate::errors::TransportStatus;
use crate::header::Header;
use crate::method::RequestMethod;
use encoding_rs::Encoding;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, SERVER};
use http::{HeaderMap, HeaderName, StatusCode, Version};
use url::Url;

/// A transport-level failure attached to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub status: TransportStatus,
    pub message: String,
}

impl TransportFailure {
    pub fn new(status: TransportStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn from_error(e: &reqwest::Error) -> Self {
        Self::new(TransportStatus::classify(e), e.to_string())
    }
}

/// Everything read off the wire for one exchange, before decoding.
#[derive(Debug)]
pub(crate) struct ResponseParts {
    pub status: StatusCode,
    pub url: Url,
    pub version: Version,
    pub headers: HeaderMap,
    pub method: RequestMethod,
    /// Raw body, or the reason it could not be read
    pub body: std::result::Result<Vec<u8>, String>,
}

impl ResponseParts {
    /// Drains a transport response. Body read errors are kept, not raised.
    pub(crate) fn read(response: reqwest::blocking::Response, method: RequestMethod) -> Self {
        let status = response.status();
        let url = response.url().clone();
        let version = response.version();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| e.to_string());

        Self {
            status,
            url,
            version,
            headers,
            method,
            body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    status_text: String,
    transport_status: TransportStatus,
    exception: Option<String>,
    server: Option<String>,
    response_url: Option<Url>,
    protocol_version: Option<Version>,
    method: RequestMethod,
    certificate: Option<Certificate>,
    headers: Vec<Header>,
    cookies: Vec<Cookie>,
    last_modified: Option<String>,
    content_encoding: Option<String>,
    content_type: Option<String>,
    content_length: Option<u64>,
    character_set: Option<String>,
    body: String,
}

impl Response {
    pub(crate) fn from_parts(
        parts: ResponseParts,
        encoding: &'static Encoding,
        failure: Option<TransportFailure>,
        cookies: Vec<Cookie>,
        certificate: Option<Certificate>,
    ) -> Self {
        let ResponseParts {
            status,
            url,
            version,
            headers,
            method,
            body,
        } = parts;

        let body = match body {
            Ok(bytes) => decode_body(&bytes, encoding),
            Err(e) => {
                log::debug!("could not read body of {url}: {e}");
                String::new()
            }
        };

        let text = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = text(CONTENT_TYPE);
        let character_set = content_type.as_deref().and_then(charset_of);

        let (transport_status, exception) = match failure {
            Some(f) => (f.status, Some(f.message)),
            None => (TransportStatus::Success, None),
        };

        Self {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            transport_status,
            exception,
            server: text(SERVER),
            protocol_version: Some(version),
            method,
            certificate,
            headers: collect_headers(&headers),
            cookies,
            last_modified: text(LAST_MODIFIED),
            content_encoding: text(CONTENT_ENCODING),
            content_length: text(CONTENT_LENGTH).and_then(|v| v.trim().parse().ok()),
            content_type,
            character_set,
            response_url: Some(url),
            body,
        }
    }

    /// A response for an exchange that produced nothing but a failure.
    pub fn from_failure(failure: TransportFailure, method: RequestMethod) -> Self {
        Self {
            status_code: 0,
            status_text: String::new(),
            transport_status: failure.status,
            exception: Some(failure.message),
            server: None,
            response_url: None,
            protocol_version: None,
            method,
            certificate: None,
            headers: Vec::new(),
            cookies: Vec::new(),
            last_modified: None,
            content_encoding: None,
            content_type: None,
            content_length: None,
            character_set: None,
            body: String::new(),
        }
    }

    /// No failure recorded and a status code in `200..=399`.
    pub fn is_success(&self) -> bool {
        self.exception.is_none()
            && self.transport_status.is_success()
            && (200..=399).contains(&self.status_code)
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn transport_status(&self) -> TransportStatus {
        self.transport_status
    }

    /// Description of the transport failure, if there was one.
    pub fn exception(&self) -> Option<&str> {
        self.exception.as_deref()
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// URL of the final hop.
    pub fn response_url(&self) -> Option<&Url> {
        self.response_url.as_ref()
    }

    pub fn protocol_version(&self) -> Option<Version> {
        self.protocol_version
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    pub fn has_certificate(&self) -> bool {
        self.certificate.is_some()
    }

    /// Headers in the order received. Repeated headers appear once per value.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Cookies set by the server over the whole exchange, redirects included.
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// `charset` parameter of the `Content-Type` header.
    pub fn character_set(&self) -> Option<&str> {
        self.character_set.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

fn decode_body(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!("body contained invalid {} sequences", used.name());
    }
    text.into_owned()
}

fn collect_headers(headers: &HeaderMap) -> Vec<Header> {
    headers
        .iter()
        .map(|(name, value)| {
            Header::new(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn charset_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn parts(status: u16, headers: &[(&'static str, &'static str)], body: &[u8]) -> ResponseParts {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(*name, HeaderValue::from_static(value));
        }
        ResponseParts {
            status: StatusCode::from_u16(status).unwrap(),
            url: "http://example.com/final".parse().unwrap(),
            version: Version::HTTP_11,
            headers: map,
            method: RequestMethod::Get,
            body: Ok(body.to_vec()),
        }
    }

    #[test]
    fn metadata_is_extracted() {
        let r = Response::from_parts(
            parts(
                200,
                &[
                    ("server", "test-server"),
                    ("content-type", "text/html; charset=\"ISO-8859-1\""),
                    ("content-length", "5"),
                    ("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
                ],
                b"hello",
            ),
            encoding_rs::UTF_8,
            None,
            Vec::new(),
            None,
        );

        assert!(r.is_success());
        assert_eq!(r.status_text(), "OK");
        assert_eq!(r.server(), Some("test-server"));
        assert_eq!(r.character_set(), Some("ISO-8859-1"));
        assert_eq!(r.content_length(), Some(5));
        assert_eq!(r.last_modified(), Some("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(r.response_url().unwrap().path(), "/final");
        assert_eq!(r.protocol_version(), Some(Version::HTTP_11));
        assert_eq!(r.header("Content-Length"), Some("5"));
        assert_eq!(r.body(), "hello");
        assert!(!r.has_certificate());
    }

    #[test]
    fn repeated_headers_keep_every_value() {
        let r = Response::from_parts(
            parts(200, &[("x-tag", "a"), ("x-tag", "b")], b""),
            encoding_rs::UTF_8,
            None,
            Vec::new(),
            None,
        );
        let tags: Vec<_> = r.headers().iter().filter(|h| h.name == "x-tag").map(|h| h.value.as_str()).collect();
        assert_eq!(tags, ["a", "b"]);
    }

    #[test]
    fn body_uses_the_configured_encoding() {
        let r = Response::from_parts(parts(200, &[], b"caf\xe9"), encoding_rs::WINDOWS_1252, None, Vec::new(), None);
        assert_eq!(r.body(), "café");
    }

    #[test]
    fn unreadable_body_becomes_empty() {
        let mut p = parts(200, &[], b"");
        p.body = Err("connection reset".into());
        let r = Response::from_parts(p, encoding_rs::UTF_8, None, Vec::new(), None);
        assert_eq!(r.body(), "");
        assert!(r.is_success());
    }

    #[test]
    fn success_range_is_inclusive() {
        for (code, ok) in [(199, false), (200, true), (302, true), (399, true), (400, false)] {
            let r = Response::from_parts(parts(code, &[], b""), encoding_rs::UTF_8, None, Vec::new(), None);
            assert_eq!(r.is_success(), ok, "status {code}");
        }
    }

    #[test]
    fn protocol_failures_are_not_successful() {
        let failure = TransportFailure::new(TransportStatus::ProtocolError, "HTTP status client error (404 Not Found)");
        let r = Response::from_parts(parts(404, &[], b"missing"), encoding_rs::UTF_8, Some(failure), Vec::new(), None);
        assert!(!r.is_success());
        assert_eq!(r.status_code(), 404);
        assert_eq!(r.transport_status(), TransportStatus::ProtocolError);
        assert!(r.exception().unwrap().contains("404"));
        assert_eq!(r.body(), "missing");
    }

    #[test]
    fn failure_only_response() {
        let r = Response::from_failure(TransportFailure::new(TransportStatus::Timeout, "timed out"), RequestMethod::Post);
        assert!(!r.is_success());
        assert_eq!(r.status_code(), 0);
        assert_eq!(r.method(), RequestMethod::Post);
        assert!(r.response_url().is_none());
        assert!(!r.has_headers());
    }
}
