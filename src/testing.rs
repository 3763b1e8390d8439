//! In-process request helpers for tests.
//!
//! [`RequestFactory`] builds [`Request`]s for code that talks to a
//! [`Dispatcher`](crate::Dispatcher) or a middleware directly. [`Client`]
//! drives a whole [`Api`] without a socket:
//!
//! ```rust
//! use restkit::testing::Client;
//! use restkit::{Api, CollectionOptions, Config, Request, Resource};
//! use serde_json::{Value, json};
//!
//! async fn index(_: Request) -> Value { json!([]) }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut api = Api::new(Config::default()).unwrap();
//! api.register(Resource::new("todos").index(index), CollectionOptions::default()).unwrap();
//!
//! let client = Client::new(api);
//! let res = client.get("/todos").send().await.unwrap();
//! assert_eq!(res.status_code(), 200);
//! assert_eq!(res.body(), b"[]");
//! # });
//! ```

use std::net::SocketAddr;

use bytes::Bytes;
use http::header;
use serde_json::Value;

use crate::api::Api;
use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;

// ── RequestBuilder ───────────────────────────────────────────────────────────

/// One request under construction.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
}

impl RequestBuilder {
    fn new(method: Method, uri: &str, headers: &[(String, String)]) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: headers.to_vec(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Sets a raw body with its content type.
    pub fn body(self, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut this = self.header(header::CONTENT_TYPE.as_str(), content_type);
        this.body = body.into();
        this
    }

    /// A JSON body, `Content-Type: application/json`.
    pub fn json(self, data: &Value) -> Self {
        self.body("application/json", data.to_string())
    }

    /// A form body, `Content-Type: application/x-www-form-urlencoded`.
    pub fn form(self, pairs: &[(&str, &str)]) -> Self {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.body("application/x-www-form-urlencoded", encoded)
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// The transport form, as a server would hand it to [`Api::handle`].
    pub fn into_http(self) -> Result<http::Request<Bytes>, Error> {
        let mut builder = http::Request::builder()
            .method(http::Method::from(self.method))
            .uri(self.uri.as_str());
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(self.body).map_err(Error::custom)
    }

    /// A normalized [`Request`] with no path parameters.
    pub fn build(self) -> Result<Request, Error> {
        let remote_addr = self.remote_addr;
        Ok(Request::from_http(self.into_http()?, remote_addr)?)
    }
}

// ── RequestFactory ───────────────────────────────────────────────────────────

/// Builds requests, optionally with headers shared by all of them.
#[derive(Clone, Debug, Default)]
pub struct RequestFactory {
    headers: Vec<(String, String)>,
}

impl RequestFactory {
    pub fn new() -> Self { Self::default() }

    /// Adds a header every built request carries.
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn request(&self, method: Method, uri: &str) -> RequestBuilder {
        RequestBuilder::new(method, uri, &self.headers)
    }

    pub fn get(&self, uri: &str) -> RequestBuilder     { self.request(Method::Get, uri) }
    pub fn post(&self, uri: &str) -> RequestBuilder    { self.request(Method::Post, uri) }
    pub fn put(&self, uri: &str) -> RequestBuilder     { self.request(Method::Put, uri) }
    pub fn patch(&self, uri: &str) -> RequestBuilder   { self.request(Method::Patch, uri) }
    pub fn delete(&self, uri: &str) -> RequestBuilder  { self.request(Method::Delete, uri) }
    pub fn options(&self, uri: &str) -> RequestBuilder { self.request(Method::Options, uri) }
    pub fn head(&self, uri: &str) -> RequestBuilder    { self.request(Method::Head, uri) }
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Sends requests straight into an [`Api`].
pub struct Client {
    api: Api,
    factory: RequestFactory,
}

impl Client {
    pub fn new(api: Api) -> Self {
        Self { api, factory: RequestFactory::new() }
    }

    pub fn api(&self) -> &Api { &self.api }

    pub fn request(&self, method: Method, uri: &str) -> ClientRequest<'_> {
        ClientRequest { api: &self.api, inner: self.factory.request(method, uri) }
    }

    pub fn get(&self, uri: &str) -> ClientRequest<'_>     { self.request(Method::Get, uri) }
    pub fn post(&self, uri: &str) -> ClientRequest<'_>    { self.request(Method::Post, uri) }
    pub fn put(&self, uri: &str) -> ClientRequest<'_>     { self.request(Method::Put, uri) }
    pub fn patch(&self, uri: &str) -> ClientRequest<'_>   { self.request(Method::Patch, uri) }
    pub fn delete(&self, uri: &str) -> ClientRequest<'_>  { self.request(Method::Delete, uri) }
    pub fn options(&self, uri: &str) -> ClientRequest<'_> { self.request(Method::Options, uri) }
    pub fn head(&self, uri: &str) -> ClientRequest<'_>    { self.request(Method::Head, uri) }
}

/// A request bound to a [`Client`]; finish with [`send`](Self::send).
pub struct ClientRequest<'a> {
    api: &'a Api,
    inner: RequestBuilder,
}

impl ClientRequest<'_> {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    pub fn body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.inner = self.inner.body(content_type, body);
        self
    }

    pub fn json(mut self, data: &Value) -> Self {
        self.inner = self.inner.json(data);
        self
    }

    pub fn form(mut self, pairs: &[(&str, &str)]) -> Self {
        self.inner = self.inner.form(pairs);
        self
    }

    /// Routes, dispatches and renders the request.
    pub async fn send(self) -> Result<Response, Error> {
        let remote_addr = self.inner.remote_addr;
        self.api.handle(self.inner.into_http()?, remote_addr).await
    }
}
