//! The client's cookie jar.
//!
//! A [`CookieJar`] is an ordered set of cookies keyed by (name, domain, path).
//! Inserting a cookie whose key is already present replaces the stored one;
//! insertion never fails. The jar itself is not synchronized: a plain
//! [`Client`](crate::Client) owns it outright and a
//! [`SharedClient`](crate::SharedClient) guards it with its session lock.
//!
//! Jars can be persisted as JSON, either to a string or to a file.

use crate::cookies::Cookie;
use crate::errors::Result;
use http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// First cookie with the given name, regardless of domain and path.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Inserts `cookie`, returning the cookie it replaced, if any.
    pub fn insert(&mut self, cookie: Cookie) -> Option<Cookie> {
        match self.cookies.iter_mut().find(|c| c.same_key(&cookie)) {
            Some(existing) => Some(std::mem::replace(existing, cookie)),
            None => {
                self.cookies.push(cookie);
                None
            }
        }
    }

    /// Inserts the cookie, or drops the stored one when the cookie is a removal.
    pub fn apply(&mut self, cookie: Cookie) {
        if cookie.is_removal() {
            let (name, domain, path) = cookie.key();
            self.remove(name, domain, path);
        } else {
            self.insert(cookie);
        }
    }

    pub fn remove(&mut self, name: &str, domain: &str, path: &str) -> Option<Cookie> {
        let idx = self.cookies.iter().position(|c| c.key() == (name, domain, path))?;
        Some(self.cookies.remove(idx))
    }

    /// Removes every cookie named `name`.
    pub fn remove_named(&mut self, name: &str) {
        self.cookies.retain(|c| c.name != name);
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Parses all `Set-Cookie` headers received from `url` into the jar and
    /// returns the cookies that were parsed.
    pub fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) -> Vec<Cookie> {
        self.store_set_cookie_values(url, headers.get_all(http::header::SET_COOKIE).iter())
    }

    pub(crate) fn store_set_cookie_values<'a>(
        &mut self,
        url: &Url,
        values: impl Iterator<Item = &'a HeaderValue>,
    ) -> Vec<Cookie> {
        let parsed: Vec<Cookie> = values
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| Cookie::parse_set_cookie(v, url))
            .collect();

        for cookie in &parsed {
            self.apply(cookie.clone());
        }
        parsed
    }

    /// `Cookie` request header value for `url`, or `None` if nothing matches.
    pub fn request_header(&self, url: &Url) -> Option<String> {
        let header = self
            .cookies
            .iter()
            .filter(|c| c.matches(url))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            None
        } else {
            Some(header)
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the jar to `path` as JSON, replacing the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Loads a jar previously written with [`CookieJar::save`]. A missing file
    /// yields an empty jar.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Extend<Cookie> for CookieJar {
    fn extend<T: IntoIterator<Item = Cookie>>(&mut self, iter: T) {
        for cookie in iter {
            self.apply(cookie);
        }
    }
}

impl FromIterator<Cookie> for CookieJar {
    fn from_iter<T: IntoIterator<Item = Cookie>>(iter: T) -> Self {
        let mut jar = CookieJar::new();
        jar.extend(iter);
        jar
    }
}

impl<'a> IntoIterator for &'a CookieJar {
    type Item = &'a Cookie;
    type IntoIter = std::slice::Iter<'a, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.iter()
    }
}
