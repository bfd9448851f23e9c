//! Network layer: executes one prepared request and turns whatever comes
//! back into a [`Response`].

pub(crate) mod fetch;
mod response;
mod tls;

pub use response::{Response, TransportFailure};
pub use tls::{accept_certificate, PolicyErrors};
