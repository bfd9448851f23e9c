//! Fetches a url twice, once blocking and once through the shared client on
//! a tokio runtime, and prints what came back.
//!
//!     RUST_LOG=debug cargo run --example fetch -- https://example.com/

use minimal_http::{Client, ClientConfig, RequestMethods, Response};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com/".to_string());

    // Accept self-signed certificates for hosts we run ourselves, reject
    // anything else the platform verifier did not like.
    let config = ClientConfig::builder()
        .timeout(Duration::from_secs(30))
        .disable_caching(true)
        .certificate_validator(|cert| cert.issuer() == cert.subject() && !cert.is_expired())
        .build()?;

    let mut client = Client::with_config(config);
    client.add_header_line("Accept: text/html,application/xhtml+xml")?;

    let response = client.get(&url)?;
    print_response(&response);

    let shared = client.into_shared();
    let runtime = tokio::runtime::Runtime::new()?;
    let again = runtime.block_on(shared.head_async(url))?;
    print_response(&again);
    println!("referer chained to: {}", shared.referer().unwrap_or_default());

    for cookie in shared.cookies().iter() {
        println!("cookie {}={} ({})", cookie.name, cookie.value, cookie.domain.as_deref().unwrap_or("-"));
    }

    Ok(())
}

fn print_response(response: &Response) {
    println!(
        "{} {} {} ({})",
        response.method(),
        response.status_code(),
        response.status_text(),
        response.response_url().map(|u| u.as_str()).unwrap_or("-")
    );
    if let Some(e) = response.exception() {
        println!("  failed: {e}");
    }
    if let Some(cert) = response.certificate() {
        println!("  certificate: {} valid until {}", cert.subject(), cert.not_after());
    }
    for header in response.headers() {
        println!("  {}: {}", header.name, header.value);
    }
    println!("  {} bytes of body", response.body().len());
}
