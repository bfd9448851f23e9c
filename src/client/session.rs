use crate::cookies::{Cookie, CookieJar};
use crate::header::Header;
use url::Url;

/// Mutable per-client state that requests read and update.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Session {
    pub location: Option<String>,
    pub referer: Option<String>,
    /// Explicit referer for the next request only
    pub pending_referer: Option<String>,
    pub cookies: CookieJar,
    pub headers: Vec<Header>,
}

impl Session {
    /// Picks the `Referer` for a request to `url` and moves `location` to it.
    ///
    /// The previous location becomes the referer unless `clear_referer` is
    /// set or an explicit referer is pending.
    pub(crate) fn advance(&mut self, url: &Url, clear_referer: bool) -> Option<String> {
        let pending = self.pending_referer.take();
        let referer = if clear_referer {
            None
        } else {
            pending.or_else(|| self.location.clone())
        };

        self.referer = referer.clone();
        self.location = Some(url.to_string());
        referer
    }

    /// Folds the result of an exchange back in.
    pub(crate) fn absorb(&mut self, final_url: &Url, cookies: &[Cookie]) {
        for cookie in cookies {
            log::trace!("cookie {}={} from {final_url}", cookie.name, cookie.value);
            self.cookies.apply(cookie.clone());
        }
        self.location = Some(final_url.to_string());
    }
}
