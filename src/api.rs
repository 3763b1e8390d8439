//! The central application object.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;

use crate::config::{ActionMap, Config};
use crate::dispatcher::Dispatcher;
use crate::error::{Error, HttpError};
use crate::method::Method;
use crate::registry::Registry;
use crate::renderers::JsonRenderer;
use crate::request::Request;
use crate::resource::Resource;
use crate::response::Response;
use crate::router::{CollectionOptions, FormatSuffix, RouteOptions, Router};

/// Owns the configuration, the route table and the dispatcher.
///
/// Register every resource at startup, then hand the `Api` to a
/// [`Server`](crate::Server) or drive it directly with [`Api::handle`].
///
/// ```rust
/// use restkit::{Api, CollectionOptions, Config, Request, Resource};
/// use serde_json::{Value, json};
///
/// async fn index(_: Request) -> Value { json!([{"id": 1}]) }
///
/// let mut api = Api::new(Config::default()).unwrap();
/// api.register(Resource::new("todos").index(index), CollectionOptions::default()).unwrap();
/// assert!(api.router().get("todos_list").is_some());
/// assert!(api.router().get("todos_item").is_some());
/// ```
pub struct Api {
    config: Config,
    router: Router,
    dispatcher: Dispatcher,
}

impl Api {
    /// An `Api` whose components come from the built-in [`Registry`].
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::with_registry(config, &Registry::with_builtins())
    }

    /// Fails with [`Error::UnknownComponent`] if the config names a parser,
    /// renderer or middleware `registry` does not know.
    pub fn with_registry(config: Config, registry: &Registry) -> Result<Self, Error> {
        let dispatcher = Dispatcher::from_config(&config, registry)?;
        let router = Router::new(config.action_map.clone()).head_fallback(config.head_fallback_to_get);
        Ok(Self { config, router, dispatcher })
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn router(&self) -> &Router { &self.router }

    // ── Registration ─────────────────────────────────────────────────────────

    /// See [`Router::add_route`].
    pub fn add_route(
        &mut self,
        resource: impl Into<Arc<Resource>>,
        pattern: &str,
        endpoint: &str,
        methods: Option<&[Method]>,
        actions: Option<&ActionMap>,
    ) -> Result<(), Error> {
        self.router.add_route(resource, pattern, endpoint, methods, actions)
    }

    /// See [`Router::add_route_with_format_suffix`].
    pub fn add_route_with_format_suffix(
        &mut self,
        resource: impl Into<Arc<Resource>>,
        pattern: &str,
        endpoint: &str,
        methods: Option<&[Method]>,
        actions: Option<&ActionMap>,
        suffix: FormatSuffix,
    ) -> Result<(), Error> {
        self.router.add_route_with_format_suffix(resource, pattern, endpoint, methods, actions, suffix)
    }

    /// A singular resource. See [`Router::route`].
    pub fn route(&mut self, resource: impl Into<Arc<Resource>>, options: RouteOptions) -> Result<(), Error> {
        self.router.route(resource, options)
    }

    /// A plural resource. See [`Router::register_collection`].
    pub fn register(&mut self, resource: impl Into<Arc<Resource>>, options: CollectionOptions) -> Result<(), Error> {
        self.router.register_collection(resource, options)
    }

    // ── Serving ──────────────────────────────────────────────────────────────

    /// Routes and dispatches one transport request.
    ///
    /// Routing failures and unknown methods are rendered as JSON error
    /// responses. `Err` means a configuration or application failure; the
    /// transport decides what to send, typically a bare 500.
    pub async fn handle(
        &self,
        req: http::Request<Bytes>,
        remote_addr: Option<SocketAddr>,
    ) -> Result<Response, Error> {
        let mut req = match Request::from_http(req, remote_addr) {
            Ok(req) => req,
            Err(err) => return error_response(err),
        };
        let matched = match self.router.resolve(req.path(), req.method()) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::debug!(method = %req.method(), path = req.path(), error = %err, "no route");
                return error_response(err);
            }
        };
        req.set_params(matched.params);
        self.dispatcher.dispatch(matched.route, req).await
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api").field("router", &self.router).finish_non_exhaustive()
    }
}

fn error_response(err: HttpError) -> Result<Response, Error> {
    let mut res = Response::from(err);
    res.render(&JsonRenderer)?;
    Ok(res)
}
