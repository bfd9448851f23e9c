use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Shorthand result type used across the crate.
pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Argument out of range: {0}")]
    OutOfRange(&'static str),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid url format: {0}")]
    InvalidUrl(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server certificate for {url} was rejected")]
    CertificateRejected { url: String },

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("Cookie serialization error: {0}")]
    Cookies(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background worker failed: {0}")]
    Worker(String),
}

impl HttpError {
    /// True for failures raised by the network/TLS stack, as opposed to caller misuse.
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Transport(_) | HttpError::CertificateRejected { .. })
    }

    /// Classification of a transport failure. Non-transport errors report `UnknownError`.
    pub fn transport_status(&self) -> TransportStatus {
        match self {
            HttpError::Transport(e) => TransportStatus::classify(e),
            HttpError::CertificateRejected { .. } => TransportStatus::TrustFailure,
            _ => TransportStatus::UnknownError,
        }
    }
}

impl From<rustls::Error> for HttpError {
    fn from(e: rustls::Error) -> Self {
        HttpError::Tls(e.to_string())
    }
}

/// Coarse classification of how an exchange ended at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportStatus {
    #[default]
    Success,
    /// The server answered, but with a 4xx/5xx status.
    ProtocolError,
    ConnectFailure,
    Timeout,
    NameResolutionFailure,
    TrustFailure,
    RedirectFailure,
    ReceiveFailure,
    UnknownError,
}

impl TransportStatus {
    pub fn classify(e: &reqwest::Error) -> Self {
        if e.is_status() {
            TransportStatus::ProtocolError
        } else if e.is_timeout() {
            TransportStatus::Timeout
        } else if e.is_redirect() {
            TransportStatus::RedirectFailure
        } else if e.is_connect() {
            let host_is_domain = matches!(e.url().and_then(|u| u.host()), Some(url::Host::Domain(_)));
            Self::classify_connect(io_source(e).map(io::Error::kind), host_is_domain)
        } else if e.is_body() || e.is_decode() {
            TransportStatus::ReceiveFailure
        } else {
            TransportStatus::UnknownError
        }
    }

    // reqwest folds DNS failures into connect errors, and the resolver's io
    // error carries no dedicated kind. A named host whose connect error has
    // no socket-level kind is taken to have failed resolution.
    fn classify_connect(kind: Option<io::ErrorKind>, host_is_domain: bool) -> Self {
        match kind {
            Some(io::ErrorKind::TimedOut) => TransportStatus::Timeout,
            Some(
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::AddrNotAvailable
                | io::ErrorKind::PermissionDenied,
            ) => TransportStatus::ConnectFailure,
            _ if host_is_domain => TransportStatus::NameResolutionFailure,
            _ => TransportStatus::ConnectFailure,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == TransportStatus::Success
    }
}

/// First `io::Error` in the source chain of `e`.
fn io_source(e: &reqwest::Error) -> Option<&io::Error> {
    let mut source = StdError::source(e);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        source = err.source();
    }
    None
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportStatus::Success => "success",
            TransportStatus::ProtocolError => "protocol error",
            TransportStatus::ConnectFailure => "connect failure",
            TransportStatus::Timeout => "timeout",
            TransportStatus::NameResolutionFailure => "name resolution failure",
            TransportStatus::TrustFailure => "trust failure",
            TransportStatus::RedirectFailure => "redirect failure",
            TransportStatus::ReceiveFailure => "receive failure",
            TransportStatus::UnknownError => "unknown error",
        };
        f.write_str(s)
    }
}
