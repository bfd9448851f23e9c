//! The client session.
//!
//! A [`Client`] owns its configuration and its session state: the cookie
//! jar, the pending headers and the `Location`/`Referer` bookkeeping. Every
//! verb goes through [`RequestMethods::send`], which
//!
//! 1. validates the method and turns the url into a [`Url`](url::Url),
//!    backslashes normalized,
//! 2. decides the outbound `Referer` and records the url as the new location,
//! 3. snapshots config, headers and cookies into a detached request,
//! 4. executes it (blocking) and
//! 5. merges received cookies and the final url back into the session.
//!
//! `Client` takes `&mut self` for requests and does no locking. To share a
//! session between threads, convert it with [`Client::into_shared`].

mod session;
mod shared;
mod verbs;

pub use shared::SharedClient;
pub use verbs::{Payload, RequestMethods};

use crate::config::ClientConfig;
use crate::cookies::CookieJar;
use crate::errors::{HttpError, Result};
use crate::header::Header;
use crate::method::RequestMethod;
use crate::net::fetch::{self, Exchange, PreparedRequest};
use crate::net::Response;
use crate::utils;
use encoding_rs::Encoding;
use session::Session;

#[derive(Debug, Clone, Default)]
pub struct Client {
    config: ClientConfig,
    session: Session,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            session: Session::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn has_proxy(&self) -> bool {
        self.config.has_proxy()
    }

    /// Url of the last request (after redirects, once it completed).
    pub fn location(&self) -> Option<&str> {
        self.session.location.as_deref()
    }

    /// `Referer` sent with the last request.
    pub fn referer(&self) -> Option<&str> {
        self.session.referer.as_deref()
    }

    /// Uses `referer` for the next request instead of the current location.
    pub fn set_referer(&mut self, referer: impl Into<String>) {
        self.session.pending_referer = Some(referer.into());
    }

    pub fn headers(&self) -> &[Header] {
        &self.session.headers
    }

    pub fn has_headers(&self) -> bool {
        !self.session.headers.is_empty()
    }

    /// Adds a header sent with every following request.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.session.headers.push(Header::new(name, value));
    }

    /// Adds a header given as `"Name: Value"` text.
    pub fn add_header_line(&mut self, line: &str) -> Result<()> {
        self.session.headers.push(Header::parse(line)?);
        Ok(())
    }

    /// Removes every pending header called `name`, returning how many were removed.
    pub fn remove_header(&mut self, name: &str) -> usize {
        let before = self.session.headers.len();
        self.session.headers.retain(|h| !h.name.eq_ignore_ascii_case(name));
        before - self.session.headers.len()
    }

    pub fn clear_headers(&mut self) {
        self.session.headers.clear();
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.session.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.session.cookies
    }

    pub fn has_cookies(&self) -> bool {
        !self.session.cookies.is_empty()
    }

    pub fn clear_cookies(&mut self) {
        self.session.cookies.clear();
    }

    pub fn into_shared(self) -> SharedClient {
        SharedClient::new(self)
    }

    pub(crate) fn prepare(
        &mut self,
        method: RequestMethod,
        url: &str,
        data: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<PreparedRequest> {
        if !method.is_executable() {
            return Err(HttpError::OutOfRange("method"));
        }
        let url = utils::create_uri(url)?;
        let referer = self.session.advance(&url, self.config.clear_referer);

        Ok(PreparedRequest {
            method,
            url,
            referer,
            cookies: self.session.cookies.clone(),
            headers: self.session.headers.clone(),
            body: data,
            content_type: content_type.map(str::to_string),
            config: self.config.clone(),
        })
    }

    pub(crate) fn commit(&mut self, exchange: &Exchange) {
        self.session.absorb(&exchange.final_url, &exchange.cookies);
    }
}

impl RequestMethods for Client {
    fn send(
        &mut self,
        method: RequestMethod,
        url: &str,
        data: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<Response> {
        let request = self.prepare(method, url, data, content_type)?;
        let exchange = fetch::execute(request)?;
        self.commit(&exchange);
        Ok(exchange.response)
    }

    fn encoding(&self) -> &'static Encoding {
        self.config.encoding
    }
}
