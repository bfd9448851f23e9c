use crate::client::verbs::{self, Payload, RequestMethods};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::cookies::CookieJar;
use crate::errors::{HttpError, Result};
use crate::header::Header;
use crate::method::RequestMethod;
use crate::net::fetch;
use crate::net::Response;
use encoding_rs::Encoding;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A [`Client`] that can be used from several threads at once.
///
/// Cloning the handle shares the session. The lock is held while a request
/// is prepared and while its results are merged back, never during network
/// I/O, so concurrent requests run in parallel and the last one to finish
/// decides the location.
#[derive(Debug, Clone)]
pub struct SharedClient {
    inner: Arc<Mutex<Client>>,
}

impl SharedClient {
    pub fn new(client: Client) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Client> {
        // a panic while holding the lock cannot leave the session half-written
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the underlying client.
    pub fn with_client<R>(&self, f: impl FnOnce(&mut Client) -> R) -> R {
        f(&mut *self.lock())
    }

    pub fn configure<R>(&self, f: impl FnOnce(&mut ClientConfig) -> R) -> R {
        f(self.lock().config_mut())
    }

    /// A detached copy of the session, taken under the lock.
    pub fn clone_client(&self) -> Client {
        self.lock().clone()
    }

    pub fn location(&self) -> Option<String> {
        self.lock().location().map(str::to_string)
    }

    pub fn referer(&self) -> Option<String> {
        self.lock().referer().map(str::to_string)
    }

    pub fn set_referer(&self, referer: impl Into<String>) {
        self.lock().set_referer(referer);
    }

    pub fn headers(&self) -> Vec<Header> {
        self.lock().headers().to_vec()
    }

    pub fn add_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock().add_header(name, value);
    }

    pub fn add_header_line(&self, line: &str) -> Result<()> {
        self.lock().add_header_line(line)
    }

    pub fn clear_headers(&self) {
        self.lock().clear_headers();
    }

    /// Snapshot of the cookie jar.
    pub fn cookies(&self) -> CookieJar {
        self.lock().cookies().clone()
    }

    pub fn clear_cookies(&self) {
        self.lock().clear_cookies();
    }

    /// Runs the blocking request on tokio's blocking pool.
    pub async fn send_async(
        &self,
        method: RequestMethod,
        url: impl Into<String>,
        data: Option<Vec<u8>>,
        content_type: Option<String>,
    ) -> Result<Response> {
        let url = url.into();
        self.offload(move |client| client.send(method, &url, data, content_type.as_deref()))
            .await
    }

    pub async fn get_async(&self, url: impl Into<String>) -> Result<Response> {
        self.send_async(RequestMethod::Get, url, None, None).await
    }

    pub async fn head_async(&self, url: impl Into<String>) -> Result<Response> {
        self.send_async(RequestMethod::Head, url, None, None).await
    }

    pub async fn delete_async(&self, url: impl Into<String>) -> Result<Response> {
        self.send_async(RequestMethod::Delete, url, None, None).await
    }

    pub async fn options_async(&self, url: impl Into<String>) -> Result<Response> {
        self.send_async(RequestMethod::Options, url, None, None).await
    }

    pub async fn trace_async(&self, url: impl Into<String>) -> Result<Response> {
        self.send_async(RequestMethod::Trace, url, None, None).await
    }

    pub async fn post_async(&self, url: impl Into<String>, payload: impl Into<Payload>) -> Result<Response> {
        self.payload_async(RequestMethod::Post, url.into(), payload.into()).await
    }

    pub async fn put_async(&self, url: impl Into<String>, payload: impl Into<Payload>) -> Result<Response> {
        self.payload_async(RequestMethod::Put, url.into(), payload.into()).await
    }

    pub async fn patch_async(&self, url: impl Into<String>, payload: impl Into<Payload>) -> Result<Response> {
        self.payload_async(RequestMethod::Patch, url.into(), payload.into()).await
    }

    async fn payload_async(&self, method: RequestMethod, url: String, payload: Payload) -> Result<Response> {
        self.offload(move |client| verbs::send_payload(client, method, &url, payload, None))
            .await
    }

    async fn offload<F>(&self, f: F) -> Result<Response>
    where
        F: FnOnce(&mut SharedClient) -> Result<Response> + Send + 'static,
    {
        let mut handle = self.clone();
        tokio::task::spawn_blocking(move || f(&mut handle))
            .await
            .map_err(|e| HttpError::Worker(e.to_string()))?
    }
}

impl From<Client> for SharedClient {
    fn from(client: Client) -> Self {
        SharedClient::new(client)
    }
}

impl RequestMethods for SharedClient {
    fn send(
        &mut self,
        method: RequestMethod,
        url: &str,
        data: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<Response> {
        let request = self.lock().prepare(method, url, data, content_type)?;
        let exchange = fetch::execute(request)?;
        self.lock().commit(&exchange);
        Ok(exchange.response)
    }

    fn encoding(&self) -> &'static Encoding {
        self.lock().config().encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::Cookie;
    use std::thread;

    #[test]
    fn handles_share_one_session() {
        let shared = Client::new().into_shared();
        let other = shared.clone();
        other.add_header("X-Shared", "yes");
        other.set_referer("http://start/");
        assert_eq!(shared.headers(), vec![Header::new("X-Shared", "yes")]);

        let detached = shared.clone_client();
        shared.clear_headers();
        assert_eq!(detached.headers().len(), 1);
    }

    #[test]
    fn concurrent_preparation_keeps_the_session_consistent() {
        let shared = Client::new().into_shared();

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let handle = shared.clone();
                thread::spawn(move || {
                    for j in 0..50 {
                        handle.with_client(|c| {
                            c.prepare(RequestMethod::Get, &format!("http://h{i}.example/{j}"), None, None)
                                .unwrap();
                            c.cookies_mut()
                                .insert(Cookie::new("sid", j.to_string()).with_domain("example.com"));
                        });
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(shared.cookies().len(), 1);
        assert!(shared.location().unwrap().ends_with("/49"));
    }

    #[tokio::test]
    async fn async_wrappers_surface_argument_errors() {
        let shared = Client::new().into_shared();
        let err = shared.get_async("").await.unwrap_err();
        assert!(matches!(err, HttpError::MissingArgument("url")));

        let err = shared
            .send_async(RequestMethod::Connect, "http://example.com/", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::OutOfRange("method")));
    }
}
