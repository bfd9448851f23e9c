//! A single HTTP header and its `Name: Value` text form.

use crate::errors::{HttpError, Result};
use http::{HeaderName, HeaderValue};
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

lazy_static! {
    // name: first non-whitespace run up to ':', value: the rest minus an optional trailing ';'
    static ref HEADER_PATTERN: Regex =
        Regex::new(r"^(\S+):\s+(.+?);?$").expect("header pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses `"Name: Value"` text. The value may itself contain colons.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(HttpError::MissingArgument("header"));
        }

        let caps = HEADER_PATTERN
            .captures(text.trim_end_matches(['\r', '\n']))
            .ok_or_else(|| HttpError::InvalidFormat(format!("wrong header format: '{text}'")))?;

        Ok(Self::new(&caps[1], &caps[2]))
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }

    /// `"Name: Value"`. Fails for a header without a name.
    pub fn to_line(&self) -> Result<String> {
        if self.is_empty() {
            return Err(HttpError::InvalidOperation("header is empty"));
        }
        Ok(format!("{}: {}", self.name, self.value))
    }

    /// Converts into a typed pair ready to be put on a request.
    pub(crate) fn to_http(&self) -> Result<(HeaderName, HeaderValue)> {
        if self.is_empty() {
            return Err(HttpError::InvalidOperation("header is empty"));
        }
        let name = HeaderName::from_bytes(self.name.as_bytes())
            .map_err(|e| HttpError::InvalidFormat(format!("header name '{}': {e}", self.name)))?;
        let value = HeaderValue::from_str(&self.value)
            .map_err(|e| HttpError::InvalidFormat(format!("header value for '{}': {e}", self.name)))?;
        Ok((name, value))
    }
}

impl FromStr for Header {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self> {
        Header::parse(s)
    }
}
