use crate::config::ClientConfig;
use crate::cookies::{Cookie, CookieJar, CookieProvider};
use crate::errors::{HttpError, Result};
use crate::header::Header;
use crate::method::RequestMethod;
use crate::net::response::{ResponseParts, TransportFailure};
use crate::net::tls::{self, HandshakeRecord};
use crate::net::Response;
use http::header::{CACHE_CONTROL, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, HOST, PRAGMA, REFERER};
use http::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use std::sync::Arc;
use url::Url;

/// A request with everything the transport needs, detached from the client.
#[derive(Debug)]
pub(crate) struct PreparedRequest {
    pub method: RequestMethod,
    pub url: Url,
    pub referer: Option<String>,
    pub cookies: CookieJar,
    pub headers: Vec<Header>,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<String>,
    pub config: ClientConfig,
}

/// Outcome of a completed exchange, to be folded back into the session.
#[derive(Debug)]
pub(crate) struct Exchange {
    pub response: Response,
    pub final_url: Url,
    pub cookies: Vec<Cookie>,
}

// Executes one request and buffers the response.
//
// A 4xx/5xx answer is still an `Exchange`, with the failure recorded on the
// response. Only errors before a response arrives are returned as `Err`.
pub(crate) fn execute(request: PreparedRequest) -> Result<Exchange> {
    let PreparedRequest {
        method,
        url,
        referer,
        cookies,
        headers,
        body,
        content_type,
        config,
    } = request;

    let http_method = method.to_http().ok_or(HttpError::OutOfRange("method"))?;

    let record = Arc::new(HandshakeRecord::default());
    let provider = Arc::new(CookieProvider::new(cookies));
    let client = build_client(&config, record.clone(), provider.clone())?;

    let mut outgoing = request_headers(&config, referer.as_deref(), &headers)?;
    if let Some(body) = &body {
        if body.is_empty() {
            outgoing.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        }
        if let Some(ct) = content_type.as_deref().filter(|c| !c.is_empty()) {
            outgoing.insert(CONTENT_TYPE, header_value("Content-Type", ct)?);
        }
    }

    let mut builder = client.request(http_method, url.clone()).headers(outgoing);
    if let Some(body) = body {
        builder = builder.body(body);
    }

    log::debug!("{method} {url}");
    let response = match builder.send() {
        Ok(r) => r,
        Err(e) if record.was_rejected() => {
            log::warn!("{method} {url} aborted, certificate rejected: {e}");
            return Err(HttpError::CertificateRejected { url: url.to_string() });
        }
        Err(e) => {
            log::warn!("{method} {url} failed: {e}");
            return Err(HttpError::Transport(e));
        }
    };

    let failure = response
        .error_for_status_ref()
        .err()
        .map(|e| TransportFailure::from_error(&e));
    if let Some(f) = &failure {
        log::warn!("{method} {url}: {}", f.message);
    }

    let final_url = response.url().clone();
    let parts = ResponseParts::read(response, method);
    let received = provider.received();
    log::debug!("{method} {url} -> {} ({} cookies)", parts.status, received.len());

    let response = Response::from_parts(
        parts,
        config.encoding,
        failure,
        received.clone(),
        record.certificate_for(&final_url),
    );

    Ok(Exchange {
        response,
        final_url,
        cookies: received,
    })
}

fn build_client(
    config: &ClientConfig,
    record: Arc<HandshakeRecord>,
    provider: Arc<CookieProvider>,
) -> Result<reqwest::blocking::Client> {
    let redirects = if config.follow_redirects {
        Policy::limited(config.max_redirects)
    } else {
        Policy::none()
    };

    let mut builder = reqwest::blocking::Client::builder()
        .use_preconfigured_tls(tls::client_tls_config(config, record)?)
        .cookie_provider(provider)
        .redirect(redirects)
        .referer(false)
        .gzip(true)
        .deflate(true)
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str());

    if !config.keep_alive {
        builder = builder.pool_max_idle_per_host(0);
    }

    builder = match config.proxy.to_reqwest()? {
        Some(proxy) => builder.proxy(proxy),
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}

fn request_headers(
    config: &ClientConfig,
    referer: Option<&str>,
    headers: &[Header],
) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();

    if let Some(referer) = referer.filter(|r| !r.is_empty()) {
        map.insert(REFERER, header_value("Referer", referer)?);
    }
    if let Some(host) = config.host.as_deref() {
        map.insert(HOST, header_value("Host", host)?);
    }
    if !config.keep_alive {
        map.insert(CONNECTION, HeaderValue::from_static("close"));
    }
    if config.disable_caching {
        map.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        map.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    }

    // pending headers go last so they can override the ones above
    for header in headers {
        let (name, value) = header.to_http()?;
        map.insert(name, value);
    }
    Ok(map)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| HttpError::InvalidFormat(format!("{name} '{value}': {e}")))
}
