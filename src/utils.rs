//! Helpers shared by the client: URL creation, percent encoding, query
//! strings and content-type values.

pub mod content_types;

use crate::errors::{HttpError, Result};
use crate::parameter::Parameter;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;
use url::Url;

/// Everything except RFC 3986 unreserved characters.
const DATA_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Like [`DATA_SET`] but leaves reserved URL syntax (and existing escapes) alone.
const URI_SET: &AsciiSet = &DATA_SET
    .remove(b':').remove(b'/').remove(b'?').remove(b'#').remove(b'[').remove(b']')
    .remove(b'@').remove(b'!').remove(b'$').remove(b'&').remove(b'\'').remove(b'(')
    .remove(b')').remove(b'*').remove(b'+').remove(b',').remove(b';').remove(b'=')
    .remove(b'%');

/// Parses an absolute URL, normalizing backslashes to forward slashes first.
pub fn create_uri(url: &str) -> Result<Url> {
    if url.trim().is_empty() {
        return Err(HttpError::MissingArgument("url"));
    }

    let normalized = url.trim().replace('\\', "/");
    let parsed = Url::parse(&normalized).map_err(|e| HttpError::InvalidUrl(format!("{url}: {e}")))?;
    if parsed.cannot_be_a_base() {
        return Err(HttpError::InvalidUrl(format!("{url}: not a hierarchical url")));
    }
    Ok(parsed)
}

/// Escapes characters that may not appear in a URL, keeping its structure.
pub fn url_encode(text: &str) -> String {
    utf8_percent_encode(text, URI_SET).to_string()
}

pub fn url_decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

/// Escapes everything but unreserved characters, for use inside a query value.
pub fn data_encode(text: &str) -> String {
    utf8_percent_encode(text, DATA_SET).to_string()
}

pub fn data_decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

/// Joins parameters into `a=1&b=2`, expanding array-form parameters.
pub fn parameter_string(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(Parameter::to_query_string)
        .collect::<Vec<_>>()
        .join("&")
}

/// Appends a query string built from `parameters` to `url`, ahead of any
/// `#fragment`.
pub fn append_query(url: &str, parameters: &[Parameter]) -> String {
    if parameters.is_empty() {
        return url.to_string();
    }

    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };

    let query = parameter_string(parameters);
    let mut out = if base.ends_with('?') || base.ends_with('&') {
        format!("{base}{query}")
    } else if base.contains('?') {
        format!("{base}&{query}")
    } else {
        format!("{base}?{query}")
    };

    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Builds a `Content-Type` value out of its optional parts.
pub fn content_type(mime: &str, charset: Option<&str>, boundary: Option<&str>) -> String {
    let mut parts = Vec::with_capacity(3);
    if !mime.is_empty() {
        parts.push(mime.to_string());
    }
    if let Some(charset) = charset.filter(|c| !c.is_empty()) {
        parts.push(format!("charset={charset}"));
    }
    if let Some(boundary) = boundary.filter(|b| !b.is_empty()) {
        parts.push(format!("boundary={boundary}"));
    }
    parts.join("; ")
}

/// A resource URL plus the query parameters to attach to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    resource: String,
    parameters: Vec<Parameter>,
}

impl QueryBuilder {
    pub fn new(resource: impl Into<String>) -> Result<Self> {
        let resource = resource.into();
        if resource.is_empty() {
            return Err(HttpError::MissingArgument("resource"));
        }
        Ok(Self {
            resource,
            parameters: Vec::new(),
        })
    }

    pub fn push(&mut self, parameter: Parameter) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    /// Parses `name<delim>value` text and adds the result.
    pub fn push_str(&mut self, data: &str) -> Result<&mut Self> {
        self.parameters.push(Parameter::parse(data)?);
        Ok(self)
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Just the query string, without a leading `?`.
    pub fn query(&self) -> String {
        parameter_string(&self.parameters)
    }

    pub fn build(&self) -> String {
        append_query(&self.resource, &self.parameters)
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}
