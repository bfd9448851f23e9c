use crate::cookies::{Cookie, CookieJar};
use http::HeaderValue;
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Cookie store handed to the transport for a single request.
///
/// It starts from a snapshot of the client's jar, so cookies received on a
/// redirect hop are sent on the next hop, and it records every cookie the
/// server set during the exchange. The client merges the recorded cookies
/// back into its own jar once the request completes.
#[derive(Debug, Default)]
pub(crate) struct CookieProvider {
    inner: Mutex<ProviderState>,
}

#[derive(Debug, Default)]
struct ProviderState {
    jar: CookieJar,
    received: Vec<Cookie>,
}

impl CookieProvider {
    pub(crate) fn new(jar: CookieJar) -> Self {
        Self {
            inner: Mutex::new(ProviderState { jar, received: Vec::new() }),
        }
    }

    /// Cookies set by the server during the exchange, one per key, last one wins.
    pub(crate) fn received(&self) -> Vec<Cookie> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .received
            .clone()
    }
}

impl reqwest::cookie::CookieStore for CookieProvider {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let parsed = state.jar.store_set_cookie_values(url, cookie_headers);

        for cookie in parsed {
            match state.received.iter_mut().find(|c| c.same_key(&cookie)) {
                Some(existing) => *existing = cookie,
                None => state.received.push(cookie),
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .jar
            .request_header(url)
            .and_then(|h| HeaderValue::from_str(&h).ok())
    }
}
