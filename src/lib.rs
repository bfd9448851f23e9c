pub mod certificate;
pub mod client;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod header;
pub mod method;
pub mod net;
pub mod parameter;
pub mod proxy;
pub mod utils;

pub use certificate::{Certificate, CertificateValidator};
pub use client::{Client, Payload, RequestMethods, SharedClient};
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError};
pub use cookies::{Cookie, CookieJar};
pub use errors::{HttpError, Result, TransportStatus};
pub use header::Header;
pub use method::RequestMethod;
pub use net::{PolicyErrors, Response, TransportFailure};
pub use parameter::Parameter;
pub use proxy::Proxy;
