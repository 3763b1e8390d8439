//! # restkit
//!
//! A micro-framework for resource-oriented REST APIs.
//!
//! You describe **resources**, named bundles of actions such as `index`,
//! `read` or `create`. The router maps URIs and methods onto them, the
//! action map turns the HTTP method into an action name, and the dispatcher
//! runs the pipeline:
//!
//! - Body parsing by exact `Content-Type` (JSON, form, multipart)
//! - Global and per-resource middleware, pre-hooks in order and
//!   post-hooks in reverse
//! - Return-value normalization into a [`Response`]
//! - Rendering by URI format suffix (`/todos.json`), or the first renderer
//!
//! Client errors ([`HttpError`]) become `{"message": "..."}` responses with
//! the right status. Everything else is logged and handed back as an
//! [`Error`]; the [`Server`] answers those with a bare `500`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use restkit::{Api, CollectionOptions, Config, HttpError, Request, Resource, Server};
//! use serde_json::{Value, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restkit::Error> {
//!     let config = Config::from_env()?;
//!     restkit::logging::init(&config);
//!
//!     let mut api = Api::new(config)?;
//!     api.register(
//!         Resource::new("todos").index(index).read(read),
//!         CollectionOptions { pk: "{pk:int}".into(), ..Default::default() },
//!     )?;
//!
//!     Server::bind("0.0.0.0:5000")?.serve(api).await
//! }
//!
//! async fn index(_: Request) -> Value {
//!     json!([{"id": 1, "name": "work"}])
//! }
//!
//! async fn read(req: Request) -> Result<Value, HttpError> {
//!     let pk: u64 = req.param_as("pk")?;
//!     if pk != 1 {
//!         return Err(HttpError::not_found(format!("Todo {pk} not found.")));
//!     }
//!     Ok(json!({"id": pk, "name": "work"}))
//! }
//! ```

mod api;
mod config;
mod dispatcher;
mod error;
mod handler;
mod method;
mod negotiator;
mod registry;
mod request;
mod resource;
mod response;
mod router;
mod server;

pub mod logging;
pub mod middleware;
pub mod parsers;
pub mod renderers;
pub mod testing;

pub use api::Api;
pub use config::{ActionMap, CONFIG_ENV_VAR, Config};
pub use dispatcher::Dispatcher;
pub use error::{ComponentKind, Error, ErrorKind, HttpError};
pub use handler::Action;
pub use method::{Method, UnknownMethod};
pub use middleware::{CorsMiddleware, Middleware};
pub use negotiator::{Negotiator, media_type};
pub use parsers::{Files, Parser, UploadedFile};
pub use registry::Registry;
pub use request::{Auth, Request};
pub use resource::Resource;
pub use response::{IntoReply, Reply, Response, ResponseBuilder, make_response};
pub use router::{CollectionOptions, FormatSuffix, Route, RouteMatch, RouteOptions, Router};
pub use server::Server;

pub use http::HeaderMap;
