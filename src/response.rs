//! Outgoing response type and the [`IntoReply`] conversion trait.
//!
//! A [`Response`] starts life holding a structured value and only becomes
//! bytes when the dispatcher renders it with the negotiated renderer.
//! Actions rarely build one directly; they return a value, a
//! `(value, status)` pair or a `(value, status, headers)` triple and let
//! [`make_response`] normalize it.

use bytes::Bytes;
use http::StatusCode;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http_body_util::Full;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{Error, HttpError};
use crate::renderers::Renderer;

enum Payload {
    /// No body at all; rendering leaves the response without a content type.
    Empty,
    Data(Value),
    Rendered(Bytes),
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing response: structured data, a status and headers.
///
/// ```rust
/// use restkit::Response;
/// use serde_json::json;
///
/// let res = Response::new(json!({"id": 1}));
/// assert_eq!(res.status_code(), 200);
/// assert!(res.headers().is_empty());
///
/// let res = Response::builder()
///     .status(201)
///     .header("location", "/todos/3")
///     .data(json!({"id": 3}));
/// assert_eq!(res.status_line(), "201 Created");
/// ```
pub struct Response {
    payload: Payload,
    status: StatusCode,
    headers: HeaderMap,
}

impl Response {
    /// `200 OK` carrying `data`.
    pub fn new(data: Value) -> Self {
        Self { payload: Payload::Data(data), status: StatusCode::OK, headers: HeaderMap::new() }
    }

    /// `200 OK` with no body.
    pub fn empty() -> Self {
        Self { payload: Payload::Empty, status: StatusCode::OK, headers: HeaderMap::new() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn status_code(&self) -> u16 { self.status.as_u16() }
    pub fn set_status(&mut self, status: StatusCode) { self.status = status; }

    /// `"200 OK"`, or `"599 UNKNOWN"` for unregistered codes.
    pub fn status_line(&self) -> String {
        let reason = self.status.canonical_reason().unwrap_or("UNKNOWN");
        format!("{} {reason}", self.status.as_u16())
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Insert or replace a header. Invalid names or values are dropped with
    /// a warning.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(name, "dropping invalid response header"),
        }
    }

    /// The structured payload, until the response is rendered.
    pub fn data(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut Value> {
        match &mut self.payload {
            Payload::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self.payload, Payload::Rendered(_))
    }

    /// The rendered body; empty before rendering or for bodiless responses.
    pub fn body(&self) -> &[u8] {
        match &self.payload {
            Payload::Rendered(b) => b,
            _ => &[],
        }
    }

    /// Deserializes the rendered body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(self.body())?)
    }

    /// Serializes the payload with `renderer` and sets `Content-Type`.
    ///
    /// `204 No Content`, `304 Not Modified` and empty responses render to a
    /// zero-length body with no content type. Rendering twice is a no-op.
    pub fn render(&mut self, renderer: &dyn Renderer) -> Result<(), Error> {
        let bodiless = matches!(self.status, StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED);
        let bytes = match &self.payload {
            Payload::Rendered(_) => return Ok(()),
            Payload::Empty => Bytes::new(),
            Payload::Data(_) if bodiless => Bytes::new(),
            Payload::Data(v) => {
                let bytes = renderer.render(v)?;
                self.set_header(header::CONTENT_TYPE.as_str(), renderer.content_type());
                bytes
            }
        };
        self.payload = Payload::Rendered(bytes);
        Ok(())
    }

    /// Converts into the transport representation.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let body = match self.payload {
            Payload::Rendered(b) => b,
            Payload::Empty => Bytes::new(),
            Payload::Data(v) => serde_json::to_vec(&v).map(Bytes::from).unwrap_or_default(),
        };
        let mut res = http::Response::new(Full::new(body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl From<HttpError> for Response {
    /// `{"message": detail}` with the error's status and headers.
    fn from(err: HttpError) -> Self {
        let (kind, detail, headers) = err.into_parts();
        Self { payload: Payload::Data(json!({ "message": detail })), status: kind.status(), headers }
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Response [{}]>", self.status_line())
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`. Terminated by
/// [`data`](Self::data) or [`empty`](Self::empty).
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    /// Out-of-range codes are ignored with a warning.
    pub fn status(mut self, code: u16) -> Self {
        match StatusCode::from_u16(code) {
            Ok(status) => self.status = status,
            Err(_) => tracing::warn!(code, "ignoring invalid status code"),
        }
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn data(self, data: Value) -> Response {
        Response { payload: Payload::Data(data), status: self.status, headers: self.headers }
    }

    pub fn empty(self) -> Response {
        Response { payload: Payload::Empty, status: self.status, headers: self.headers }
    }
}

// ── Reply ────────────────────────────────────────────────────────────────────

/// Every shape an action or a short-circuiting middleware may return.
pub enum Reply {
    /// A bare value, status implied `200`.
    Data(Value),
    WithStatus(Value, u16),
    WithHeaders(Value, u16, HeaderMap),
    /// A ready response, passed through unchanged.
    Response(Response),
    /// Nothing was returned. Normalizing this is an error.
    Nothing,
}

impl From<Value> for Reply {
    fn from(v: Value) -> Self { Self::Data(v) }
}

impl From<(Value, u16)> for Reply {
    fn from((v, s): (Value, u16)) -> Self { Self::WithStatus(v, s) }
}

impl From<(Value, u16, HeaderMap)> for Reply {
    fn from((v, s, h): (Value, u16, HeaderMap)) -> Self { Self::WithHeaders(v, s, h) }
}

impl From<Response> for Reply {
    fn from(r: Response) -> Self { Self::Response(r) }
}

/// Normalizes an action's return value into a [`Response`].
///
/// Fails with [`Error::NoResponse`] for [`Reply::Nothing`] and with
/// [`Error::InvalidResponse`] for a status outside `100..=999`.
pub fn make_response(reply: Reply) -> Result<Response, Error> {
    let (data, status, headers) = match reply {
        Reply::Response(res) => return Ok(res),
        Reply::Nothing => return Err(Error::NoResponse),
        Reply::Data(v) => (v, 200, HeaderMap::new()),
        Reply::WithStatus(v, s) => (v, s, HeaderMap::new()),
        Reply::WithHeaders(v, s, h) => (v, s, h),
    };
    let status = StatusCode::from_u16(status)
        .map_err(|_| Error::InvalidResponse(format!("status code {status} is out of range")))?;
    Ok(Response { payload: Payload::Data(data), status, headers })
}

// ── IntoReply ────────────────────────────────────────────────────────────────

/// Conversion of an action's output into a [`Reply`].
///
/// Implemented for [`Reply`], [`Value`], [`Response`], `(Value, u16)`,
/// `(Value, u16, HeaderMap)`, `Option<T>` (where `None` means "no
/// response") and `Result<T, E>` for any `E: Into<Error>`, so actions can
/// use `?` on [`HttpError`] and friends.
pub trait IntoReply {
    fn into_reply(self) -> Result<Reply, Error>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, Error> { Ok(self) }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, Error> { Ok(self.into()) }
}

impl IntoReply for Response {
    fn into_reply(self) -> Result<Reply, Error> { Ok(self.into()) }
}

impl IntoReply for (Value, u16) {
    fn into_reply(self) -> Result<Reply, Error> { Ok(self.into()) }
}

impl IntoReply for (Value, u16, HeaderMap) {
    fn into_reply(self) -> Result<Reply, Error> { Ok(self.into()) }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Reply, Error> {
        match self {
            Some(t) => t.into_reply(),
            None => Ok(Reply::Nothing),
        }
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<Error>,
{
    fn into_reply(self) -> Result<Reply, Error> {
        self.map_err(Into::into)?.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::renderers::JsonRenderer;

    #[test]
    fn bare_value_defaults_to_200_and_no_headers() {
        let res = make_response(json!({"hello": "world"}).into()).unwrap();
        assert_eq!(res.status_code(), 200);
        assert!(res.headers().is_empty());
        assert_eq!(res.data(), Some(&json!({"hello": "world"})));
    }

    #[test]
    fn pair_and_triple_carry_status_and_headers() {
        let res = make_response(Reply::WithStatus(json!({"hello": "world"}), 204)).unwrap();
        assert_eq!(res.status_code(), 204);

        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("www.test.com"));
        let res = make_response((json!(1), 202, headers).into()).unwrap();
        assert_eq!(res.status_code(), 202);
        assert_eq!(res.header("host"), Some("www.test.com"));
    }

    #[test]
    fn response_passes_through() {
        let original = Response::builder().status(204).header("host", "www.test.com").empty();
        let res = make_response(original.into()).unwrap();
        assert_eq!(res.status_line(), "204 No Content");
        assert_eq!(res.header("host"), Some("www.test.com"));
    }

    #[test]
    fn nothing_and_bad_status_are_errors() {
        assert!(matches!(make_response(Reply::Nothing), Err(Error::NoResponse)));
        assert!(matches!(
            make_response(Reply::WithStatus(json!(1), 42)),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn option_and_result_convert() {
        assert!(matches!(None::<Value>.into_reply(), Ok(Reply::Nothing)));
        let failed: Result<Value, HttpError> = Err(HttpError::bad_request("no"));
        assert!(matches!(failed.into_reply(), Err(Error::Http(_))));
    }

    #[test]
    fn render_sets_content_type_once() {
        let mut res = Response::new(json!([1, 2]));
        res.render(&JsonRenderer).unwrap();
        res.render(&JsonRenderer).unwrap();
        assert_eq!(res.body(), b"[1,2]");
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.json::<Vec<u8>>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn empty_and_no_content_render_without_body() {
        let mut res = Response::empty();
        res.render(&JsonRenderer).unwrap();
        assert!(res.body().is_empty());
        assert!(res.header("content-type").is_none());

        let mut res = make_response(Reply::WithStatus(json!(""), 204)).unwrap();
        res.render(&JsonRenderer).unwrap();
        assert!(res.body().is_empty());
    }

    #[test]
    fn http_error_becomes_message_body() {
        let err = HttpError::from(ErrorKind::MethodNotAllowed).with_header("allow", "GET");
        let mut res = Response::from(err);
        res.render(&JsonRenderer).unwrap();
        assert_eq!(res.status_code(), 405);
        assert_eq!(res.body(), br#"{"message":"Method not allowed."}"#);
        assert_eq!(res.header("allow"), Some("GET"));
    }
}
