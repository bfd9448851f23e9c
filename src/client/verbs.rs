use crate::errors::Result;
use crate::method::RequestMethod;
use crate::net::Response;
use crate::parameter::Parameter;
use crate::utils::{self, content_types};
use encoding_rs::Encoding;

/// Body of a `POST`, `PUT` or `PATCH` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Sent as is, `application/octet-stream` unless told otherwise
    Bytes(Vec<u8>),
    /// Encoded with the client encoding, `text/plain` unless told otherwise
    Text(String),
    /// Serialized as a query string and encoded like text
    Parameters(Vec<Parameter>),
}

impl Payload {
    pub fn default_content_type(&self) -> &'static str {
        match self {
            Payload::Bytes(_) => content_types::APPLICATION_OCTET_STREAM,
            Payload::Text(_) | Payload::Parameters(_) => content_types::TEXT_PLAIN,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Bytes(b) => b.is_empty(),
            Payload::Text(t) => t.is_empty(),
            Payload::Parameters(p) => p.is_empty(),
        }
    }

    pub fn into_bytes(self, encoding: &'static Encoding) -> Vec<u8> {
        match self {
            Payload::Bytes(bytes) => bytes,
            Payload::Text(text) => encoding.encode(&text).0.into_owned(),
            Payload::Parameters(params) => {
                encoding.encode(&utils::parameter_string(&params)).0.into_owned()
            }
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<Parameter>> for Payload {
    fn from(params: Vec<Parameter>) -> Self {
        Payload::Parameters(params)
    }
}

impl From<&[Parameter]> for Payload {
    fn from(params: &[Parameter]) -> Self {
        Payload::Parameters(params.to_vec())
    }
}

/// The request verbs, all funneled through [`send`](RequestMethods::send).
///
/// Implemented by [`Client`](crate::Client) and
/// [`SharedClient`](crate::SharedClient).
pub trait RequestMethods {
    /// Issues one request. `data`, when present, is sent as the body with
    /// `content_type`.
    fn send(
        &mut self,
        method: RequestMethod,
        url: &str,
        data: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<Response>;

    /// Encoding used for text payloads.
    fn encoding(&self) -> &'static Encoding;

    fn get(&mut self, url: &str) -> Result<Response> {
        self.send(RequestMethod::Get, url, None, None)
    }

    fn get_with(&mut self, url: &str, parameters: &[Parameter]) -> Result<Response> {
        self.send(RequestMethod::Get, &utils::append_query(url, parameters), None, None)
    }

    fn head(&mut self, url: &str) -> Result<Response> {
        self.send(RequestMethod::Head, url, None, None)
    }

    fn head_with(&mut self, url: &str, parameters: &[Parameter]) -> Result<Response> {
        self.send(RequestMethod::Head, &utils::append_query(url, parameters), None, None)
    }

    fn delete(&mut self, url: &str) -> Result<Response> {
        self.send(RequestMethod::Delete, url, None, None)
    }

    fn delete_with(&mut self, url: &str, parameters: &[Parameter]) -> Result<Response> {
        self.send(RequestMethod::Delete, &utils::append_query(url, parameters), None, None)
    }

    fn options(&mut self, url: &str) -> Result<Response> {
        self.send(RequestMethod::Options, url, None, None)
    }

    fn options_with(&mut self, url: &str, parameters: &[Parameter]) -> Result<Response> {
        self.send(RequestMethod::Options, &utils::append_query(url, parameters), None, None)
    }

    fn trace(&mut self, url: &str) -> Result<Response> {
        self.send(RequestMethod::Trace, url, None, None)
    }

    fn trace_with(&mut self, url: &str, parameters: &[Parameter]) -> Result<Response> {
        self.send(RequestMethod::Trace, &utils::append_query(url, parameters), None, None)
    }

    fn post(&mut self, url: &str, payload: impl Into<Payload>) -> Result<Response>
    where
        Self: Sized,
    {
        send_payload(self, RequestMethod::Post, url, payload.into(), None)
    }

    fn post_as(&mut self, url: &str, payload: impl Into<Payload>, content_type: &str) -> Result<Response>
    where
        Self: Sized,
    {
        send_payload(self, RequestMethod::Post, url, payload.into(), Some(content_type))
    }

    fn put(&mut self, url: &str, payload: impl Into<Payload>) -> Result<Response>
    where
        Self: Sized,
    {
        send_payload(self, RequestMethod::Put, url, payload.into(), None)
    }

    fn put_as(&mut self, url: &str, payload: impl Into<Payload>, content_type: &str) -> Result<Response>
    where
        Self: Sized,
    {
        send_payload(self, RequestMethod::Put, url, payload.into(), Some(content_type))
    }

    fn patch(&mut self, url: &str, payload: impl Into<Payload>) -> Result<Response>
    where
        Self: Sized,
    {
        send_payload(self, RequestMethod::Patch, url, payload.into(), None)
    }

    fn patch_as(&mut self, url: &str, payload: impl Into<Payload>, content_type: &str) -> Result<Response>
    where
        Self: Sized,
    {
        send_payload(self, RequestMethod::Patch, url, payload.into(), Some(content_type))
    }
}

pub(crate) fn send_payload<C: RequestMethods + ?Sized>(
    client: &mut C,
    method: RequestMethod,
    url: &str,
    payload: Payload,
    content_type: Option<&str>,
) -> Result<Response> {
    let content_type = content_type
        .filter(|c| !c.is_empty())
        .unwrap_or(payload.default_content_type())
        .to_string();
    let body = payload.into_bytes(client.encoding());
    client.send(method, url, Some(body), Some(&content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_content_types() {
        assert_eq!(Payload::from(vec![1u8, 2]).default_content_type(), "application/octet-stream");
        assert_eq!(Payload::from("hi").default_content_type(), "text/plain");
        assert_eq!(Payload::from(Vec::<Parameter>::new()).default_content_type(), "text/plain");
    }

    #[test]
    fn text_is_encoded_with_the_client_encoding() {
        assert_eq!(Payload::from("café").into_bytes(encoding_rs::WINDOWS_1252), b"caf\xe9");
        assert_eq!(Payload::from("café").into_bytes(encoding_rs::UTF_8), "café".as_bytes());
    }

    #[test]
    fn parameters_become_a_query_string() {
        let params = vec![
            Parameter::new("a", "1").unwrap(),
            Parameter::array("b", ["x", "y"]).unwrap(),
        ];
        assert_eq!(Payload::from(params).into_bytes(encoding_rs::UTF_8), b"a=1&b[]=x&b[]=y");
    }

    struct Recorder {
        sent: Vec<(RequestMethod, String, Option<Vec<u8>>, Option<String>)>,
    }

    impl RequestMethods for Recorder {
        fn send(
            &mut self,
            method: RequestMethod,
            url: &str,
            data: Option<Vec<u8>>,
            content_type: Option<&str>,
        ) -> Result<Response> {
            self.sent.push((method, url.to_string(), data, content_type.map(str::to_string)));
            Ok(Response::from_failure(
                crate::net::TransportFailure::new(crate::TransportStatus::UnknownError, "recorded"),
                method,
            ))
        }

        fn encoding(&self) -> &'static Encoding {
            encoding_rs::UTF_8
        }
    }

    #[test]
    fn verbs_map_to_methods_and_bodies() {
        let mut r = Recorder { sent: Vec::new() };
        let q = [Parameter::new("q", "1").unwrap()];
        r.get_with("http://h/p", &q).unwrap();
        r.trace("http://h/t").unwrap();
        r.patch("http://h/x", "body").unwrap();
        r.post_as("http://h/y", Vec::<u8>::new(), "application/json").unwrap();

        assert_eq!(r.sent[0], (RequestMethod::Get, "http://h/p?q=1".into(), None, None));
        assert_eq!(r.sent[1].0, RequestMethod::Trace);
        assert_eq!(
            r.sent[2],
            (RequestMethod::Patch, "http://h/x".into(), Some(b"body".to_vec()), Some("text/plain".into()))
        );
        assert_eq!(r.sent[3].2.as_deref(), Some(&b""[..]));
        assert_eq!(r.sent[3].3.as_deref(), Some("application/json"));
    }
}
