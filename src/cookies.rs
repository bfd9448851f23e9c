// src/cookies.rs
//! Cookies: [`Cookie`], the per-client [`CookieJar`] and the per-request
//! provider handed to the transport.

mod cookie;
mod cookie_jar;
mod provider;

pub use cookie::Cookie;
pub use cookie_jar::CookieJar;

pub(crate) use provider::CookieProvider;
