//! Error types.
//!
//! Two layers:
//!
//! - [`HttpError`] is a *client-input* failure. The dispatcher turns it into
//!   a `{"message": "..."}` response with the matching status code. It never
//!   crashes the process.
//! - [`Error`] is everything else: configuration mistakes caught at
//!   registration time, programmer errors in resource actions, and I/O. The
//!   dispatcher logs these and hands them back to the caller untouched.

use std::fmt;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use thiserror::Error;

use crate::method::Method;

/// The recognised HTTP error kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    UnsupportedMediaType,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::BadRequest           => StatusCode::BAD_REQUEST,
            Self::Unauthorized         => StatusCode::UNAUTHORIZED,
            Self::Forbidden            => StatusCode::FORBIDDEN,
            Self::NotFound             => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed     => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotAcceptable        => StatusCode::NOT_ACCEPTABLE,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Detail used when the error is raised without one.
    pub fn default_detail(self) -> &'static str {
        match self {
            Self::BadRequest           => "Bad request.",
            Self::Unauthorized         => "Unauthorized.",
            Self::Forbidden            => "Forbidden.",
            Self::NotFound             => "Resource not found.",
            Self::MethodNotAllowed     => "Method not allowed.",
            Self::NotAcceptable        => "Could not satisfy the request format.",
            Self::UnsupportedMediaType => "Unsupported media type in request.",
        }
    }
}

/// A client-input error that maps straight onto an HTTP response.
///
/// ```rust
/// use restkit::{ErrorKind, HttpError};
///
/// let err = HttpError::bad_request("Invalid request data.");
/// assert_eq!(err.kind(), ErrorKind::BadRequest);
/// assert_eq!(err.status().as_u16(), 400);
///
/// let err = HttpError::from(ErrorKind::NotFound);
/// assert_eq!(err.detail(), "Resource not found.");
/// ```
#[derive(Clone, Debug, Error)]
#[error("{} {}", .kind.status().as_u16(), .detail)]
pub struct HttpError {
    kind: ErrorKind,
    detail: String,
    headers: HeaderMap,
}

impl HttpError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into(), headers: HeaderMap::new() }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, detail)
    }

    pub fn unsupported_media_type(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedMediaType, detail)
    }

    /// Attach a response header. Invalid names or values are dropped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn kind(&self) -> ErrorKind { self.kind }
    pub fn status(&self) -> StatusCode { self.kind.status() }
    pub fn detail(&self) -> &str { &self.detail }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    pub(crate) fn into_parts(self) -> (ErrorKind, String, HeaderMap) {
        (self.kind, self.detail, self.headers)
    }
}

impl From<ErrorKind> for HttpError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_detail())
    }
}

/// The error type returned by restkit's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A recognised client error; rendered, never propagated past dispatch.
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("endpoint `{0}` already exists")]
    DuplicateEndpoint(String),

    #[error("invalid route `{pattern}`: {source}")]
    InvalidRoute {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("route `{pattern}` uses unknown converter `{converter}`")]
    UnknownConverter { pattern: String, converter: String },

    #[error("format suffix must be one of disabled, optional, mandatory; got `{0}`")]
    InvalidFormatSuffix(String),

    #[error("config `ACTION_MAP` has no mapping for {0}")]
    UnmappedMethod(Method),

    #[error("resource action did not return a response")]
    NoResponse,

    #[error("resource action returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("unknown {kind} `{name}`")]
    UnknownComponent { kind: ComponentKind, name: String },

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    /// Any other failure raised by application code.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wrap an arbitrary application error.
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Custom(err.into())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::Http(kind.into())
    }
}

/// Which registry table an unknown identifier was looked up in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComponentKind {
    Parser,
    Renderer,
    Middleware,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parser     => "parser",
            Self::Renderer   => "renderer",
            Self::Middleware => "middleware",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_details_follow_kind() {
        let err = HttpError::from(ErrorKind::MethodNotAllowed);
        assert_eq!(err.detail(), "Method not allowed.");
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.to_string(), "405 Method not allowed.");
    }

    #[test]
    fn invalid_headers_are_dropped() {
        let err = HttpError::bad_request("x")
            .with_header("allow", "GET")
            .with_header("bad header", "v");
        assert_eq!(err.headers().len(), 1);
        assert_eq!(err.headers()["allow"], "GET");
    }

    #[test]
    fn http_errors_convert_into_error() {
        let err: Error = HttpError::not_found("gone").into();
        assert!(matches!(err, Error::Http(ref e) if e.detail() == "gone"));
    }
}
