//! Normalized incoming request.
//!
//! The transport hands over an `http::Request<Bytes>`; everything else is
//! derived from it on first access and cached for the rest of the request.
//! Clones share the cached head, so a field is computed at most once however
//! many times the request is handed around during one dispatch.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use http::header::{self, HeaderMap};
use http::{Uri, Version};
use once_cell::sync::{Lazy, OnceCell};
use serde_json::{Map, Value};

use crate::error::{ErrorKind, HttpError};
use crate::method::Method;
use crate::negotiator::{Negotiator, media_type};
use crate::parsers::{Files, Parser, UploadedFile};
use crate::router::decode_path;

static EMPTY_FILES: Lazy<Files> = Lazy::new(HashMap::new);
static EMPTY_DATA: Lazy<Value> = Lazy::new(empty_data);

/// The structured value an empty body parses to.
pub(crate) fn empty_data() -> Value {
    Value::Object(Map::new())
}

/// Credentials from the `Authorization` header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
    /// Any other scheme, passed through verbatim.
    Other { scheme: String, credentials: String },
}

impl Auth {
    fn parse(value: &str) -> Option<Self> {
        let (scheme, credentials) = value.trim().split_once(' ')?;
        let credentials = credentials.trim();
        if scheme.eq_ignore_ascii_case("basic") {
            let decoded = BASE64.decode(credentials).ok()?;
            let decoded = String::from_utf8(decoded).ok()?;
            let (username, password) = decoded.split_once(':')?;
            Some(Self::Basic { username: username.to_owned(), password: password.to_owned() })
        } else if scheme.eq_ignore_ascii_case("bearer") {
            Some(Self::Bearer(credentials.to_owned()))
        } else {
            Some(Self::Other { scheme: scheme.to_owned(), credentials: credentials.to_owned() })
        }
    }
}

struct Head {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    remote_addr: Option<SocketAddr>,
    args: OnceCell<HashMap<String, String>>,
    auth: OnceCell<Option<Auth>>,
    scheme: OnceCell<String>,
    environ: OnceCell<HashMap<String, String>>,
}

/// An incoming request, normalized for resource actions.
#[derive(Clone)]
pub struct Request {
    head: Arc<Head>,
    body: Bytes,
    params: HashMap<String, String>,
    data: Option<Value>,
    files: Option<Files>,
}

impl Request {
    /// Wraps a transport request. Methods outside [`Method::ALL`] are
    /// rejected with `405 Method Not Allowed`.
    pub fn from_http(
        req: http::Request<Bytes>,
        remote_addr: Option<SocketAddr>,
    ) -> Result<Self, HttpError> {
        let (parts, body) = req.into_parts();
        let method = Method::try_from(&parts.method)
            .map_err(|_| HttpError::from(ErrorKind::MethodNotAllowed))?;
        let head = Head {
            method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            remote_addr,
            args: OnceCell::new(),
            auth: OnceCell::new(),
            scheme: OnceCell::new(),
            environ: OnceCell::new(),
        };
        Ok(Self { head: Arc::new(head), body, params: HashMap::new(), data: None, files: None })
    }

    pub fn method(&self) -> Method { self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn version(&self) -> Version { self.head.version }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn query(&self) -> &str { self.head.uri.query().unwrap_or("") }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn body(&self) -> &Bytes { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.head.remote_addr }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query-string arguments. When a key repeats, the first value
    /// wins; [`Request::arg_list`] has them all.
    pub fn args(&self) -> &HashMap<String, String> {
        self.head.args.get_or_init(|| {
            let mut args = HashMap::new();
            for (k, v) in url::form_urlencoded::parse(self.query().as_bytes()).into_owned() {
                args.entry(k).or_insert(v);
            }
            args
        })
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args().get(name).map(String::as_str)
    }

    /// Every value given for `name`, in query-string order.
    pub fn arg_list(&self, name: &str) -> Vec<String> {
        url::form_urlencoded::parse(self.query().as_bytes())
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    pub fn auth(&self) -> Option<&Auth> {
        self.head
            .auth
            .get_or_init(|| self.header(header::AUTHORIZATION.as_str()).and_then(Auth::parse))
            .as_ref()
    }

    /// `https` / `http`, from the URI, else `X-Forwarded-Proto`, else `http`.
    pub fn scheme(&self) -> &str {
        self.head.scheme.get_or_init(|| {
            self.head
                .uri
                .scheme_str()
                .or_else(|| self.header("x-forwarded-proto"))
                .unwrap_or("http")
                .to_ascii_lowercase()
        })
    }

    /// The raw `Content-Type` header, parameters included.
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// The `Content-Type` without parameters, e.g. `application/json`.
    pub fn mimetype(&self) -> Option<&str> {
        self.content_type().map(media_type)
    }

    /// The declared `Content-Length`, or the buffered body size when absent.
    pub fn content_length(&self) -> Option<u64> {
        match self.header(header::CONTENT_LENGTH.as_str()) {
            Some(v) => v.trim().parse().ok(),
            None if self.body.is_empty() => None,
            None => Some(self.body.len() as u64),
        }
    }

    /// Named parameters extracted by the router.
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// For a route `/todos/{pk}`, `req.param("pk")` on `/todos/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// A path parameter parsed into `T`. Missing or malformed values are a
    /// `400 Bad Request`.
    pub fn param_as<T: FromStr>(&self, key: &str) -> Result<T, HttpError> {
        self.param(key)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| HttpError::bad_request(format!("Invalid path parameter `{key}`.")))
    }

    /// The format suffix the router extracted, e.g. `json` for `/todos.json`.
    pub fn format(&self) -> Option<&str> {
        self.param("format")
    }

    /// The parsed body. An empty object until the body is loaded.
    pub fn data(&self) -> &Value {
        self.data.as_ref().unwrap_or(&EMPTY_DATA)
    }

    pub fn data_mut(&mut self) -> &mut Value {
        self.data.get_or_insert_with(empty_data)
    }

    /// Files uploaded in a multipart body.
    pub fn files(&self) -> &Files {
        self.files.as_ref().unwrap_or(&EMPTY_FILES)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files().get(name)
    }

    /// A WSGI-style environment map: `REQUEST_METHOD`, `PATH_INFO`,
    /// `QUERY_STRING`, `SERVER_PROTOCOL`, `CONTENT_TYPE`, `CONTENT_LENGTH`,
    /// `REMOTE_ADDR`, `wsgi.url_scheme` and one `HTTP_*` entry per header.
    pub fn environ(&self) -> &HashMap<String, String> {
        self.head.environ.get_or_init(|| {
            let mut env = HashMap::new();
            env.insert("REQUEST_METHOD".to_owned(), self.method().to_string());
            env.insert("PATH_INFO".to_owned(), decode_path(self.path()).into_owned());
            env.insert("QUERY_STRING".to_owned(), self.query().to_owned());
            env.insert("SERVER_PROTOCOL".to_owned(), format!("{:?}", self.version()));
            env.insert("wsgi.url_scheme".to_owned(), self.scheme().to_owned());
            if let Some(ct) = self.content_type() {
                env.insert("CONTENT_TYPE".to_owned(), ct.to_owned());
            }
            if let Some(len) = self.content_length() {
                env.insert("CONTENT_LENGTH".to_owned(), len.to_string());
            }
            if let Some(addr) = self.remote_addr() {
                env.insert("REMOTE_ADDR".to_owned(), addr.ip().to_string());
            }
            for (name, value) in &self.head.headers {
                if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
                    continue;
                }
                if let Ok(value) = value.to_str() {
                    let key = format!("HTTP_{}", name.as_str().to_ascii_uppercase().replace('-', "_"));
                    env.entry(key)
                        .and_modify(|v: &mut String| {
                            v.push(',');
                            v.push_str(value);
                        })
                        .or_insert_with(|| value.to_owned());
                }
            }
            env
        })
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// Parses the body once with the first parser matching the content type.
    ///
    /// An empty body short-circuits to an empty object without consulting
    /// any parser, whatever the content type says. Later calls are no-ops.
    pub(crate) async fn load_body(&mut self, parsers: &[Arc<dyn Parser>]) -> Result<(), HttpError> {
        if self.data.is_some() {
            return Ok(());
        }
        if self.body.is_empty() {
            self.data = Some(empty_data());
            self.files = Some(Files::new());
            return Ok(());
        }

        let content_type = self.content_type().unwrap_or("").to_owned();
        let parser = Negotiator.select_parser(parsers, &content_type)?;
        let parsed = parser
            .parse(self.body.clone(), &content_type, self.content_length())
            .await?;
        self.data = Some(parsed.data);
        self.files = Some(parsed.files);
        Ok(())
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.head.method)
            .field("uri", &self.head.uri)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
