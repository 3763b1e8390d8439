//! The per-request pipeline.
//!
//! ```text
//! resolve action name ─▶ parse body ─▶ pre-hooks ─▶ action ─▶ make_response
//!                                          │                       │
//!                                          └── short-circuit ──────┤
//!                                                                  ▼
//!                               render ◀─ post-hooks (reverse order)
//! ```
//!
//! An [`HttpError`](crate::HttpError) raised anywhere before rendering jumps
//! straight to rendering a `{"message": detail}` body; post-hooks are
//! skipped. Any other error is logged with the request head and returned.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, ErrorKind};
use crate::handler::BoxedAction;
use crate::method::Method;
use crate::middleware::{Chain, Middleware};
use crate::negotiator::Negotiator;
use crate::parsers::Parser;
use crate::registry::Registry;
use crate::renderers::{JsonRenderer, Renderer};
use crate::request::Request;
use crate::response::{Response, make_response};
use crate::router::Route;

/// Where a dispatch was when it failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stage {
    Received,
    ParsingBody,
    MiddlewarePre,
    Action,
    MiddlewarePost,
    Rendering,
}

/// Runs resolved requests through parsing, middleware, the action and
/// rendering.
///
/// Holds the configured defaults; a resource's own parsers or renderers
/// replace them, its own middleware runs after the global ones.
pub struct Dispatcher {
    parsers: Vec<Arc<dyn Parser>>,
    renderers: Vec<Arc<dyn Renderer>>,
    middleware: Vec<Arc<dyn Middleware>>,
    logger_methods: Vec<Method>,
    head_fallback: bool,
}

impl Dispatcher {
    pub fn new(
        parsers: Vec<Arc<dyn Parser>>,
        renderers: Vec<Arc<dyn Renderer>>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self { parsers, renderers, middleware, logger_methods: Vec::new(), head_fallback: false }
    }

    /// Resolves `PARSER_CLASSES`, `RENDERER_CLASSES` and
    /// `MIDDLEWARE_CLASSES` against `registry`.
    pub fn from_config(config: &Config, registry: &Registry) -> Result<Self, Error> {
        Ok(Self {
            parsers: registry.resolve_parsers(&config.parser_classes)?,
            renderers: registry.resolve_renderers(&config.renderer_classes)?,
            middleware: registry.resolve_middleware(&config.middleware_classes, config)?,
            logger_methods: config.logger_methods.clone(),
            head_fallback: config.head_fallback_to_get,
        })
    }

    /// Methods whose bodies are logged at debug level.
    pub fn logger_methods(mut self, methods: Vec<Method>) -> Self {
        self.logger_methods = methods;
        self
    }

    /// Serve `HEAD` with the `GET` action when `HEAD` is unmapped or
    /// unimplemented.
    pub fn head_fallback(mut self, enabled: bool) -> Self {
        self.head_fallback = enabled;
        self
    }

    /// Dispatches `req` to `route`. Path parameters must already be set.
    ///
    /// Client errors come back as rendered error responses; only
    /// configuration and application failures are `Err`.
    pub async fn dispatch(&self, route: &Route, mut req: Request) -> Result<Response, Error> {
        let resource = route.resource();
        let parsers = resource.own_parsers().unwrap_or(&self.parsers);
        let renderers = resource.own_renderers().unwrap_or(&self.renderers);

        let mut stage = Stage::Received;
        let outcome = self.run(route, &mut req, parsers, &mut stage).await;
        let outcome = match outcome {
            Err(Error::Http(err)) => {
                tracing::debug!(request = %head(&req), error = %err, "client error");
                Ok(Response::from(err))
            }
            outcome => outcome,
        };
        let result = outcome.and_then(|res| {
            stage = Stage::Rendering;
            self.render(&req, res, renderers)
        });

        if let Err(err) = &result {
            tracing::error!(request = %head(&req), ?stage, error = %err, "exception while dispatching");
        }
        result
    }

    async fn run(
        &self,
        route: &Route,
        req: &mut Request,
        parsers: &[Arc<dyn Parser>],
        stage: &mut Stage,
    ) -> Result<Response, Error> {
        let method = req.method();
        let action_name = self.action_name(route, method)?;

        *stage = Stage::ParsingBody;
        req.load_body(parsers).await?;
        if self.logs(method) {
            tracing::debug!("{} <Request> {}", head(req), req.data());
        }

        let chain = Chain::new(&self.middleware, route.resource().own_middleware());
        *stage = Stage::MiddlewarePre;
        let reply = match chain.before(req).await? {
            Some(reply) => reply,
            None => {
                *stage = Stage::Action;
                let action = self.action(route, method, action_name)?;
                action.call(req.clone()).await?
            }
        };
        let res = make_response(reply)?;

        *stage = Stage::MiddlewarePost;
        chain.after(req, res).await
    }

    fn action_name<'r>(&self, route: &'r Route, method: Method) -> Result<&'r str, Error> {
        let map = route.action_map();
        match map.get(method) {
            Some(name) => Ok(name),
            None if self.fall_back(method) => map.get(Method::Get).ok_or(Error::UnmappedMethod(method)),
            None => Err(Error::UnmappedMethod(method)),
        }
    }

    fn action<'r>(&self, route: &'r Route, method: Method, name: &str) -> Result<&'r BoxedAction, Error> {
        let resource = route.resource();
        if let Some(action) = resource.get_action(name) {
            return Ok(action);
        }
        if self.fall_back(method) {
            let get = route.action_map().get(Method::Get);
            if let Some(action) = get.and_then(|name| resource.get_action(name)) {
                return Ok(action);
            }
        }
        tracing::debug!(resource = resource.name(), action = name, "unimplemented action");
        Err(ErrorKind::MethodNotAllowed.into())
    }

    fn render(
        &self,
        req: &Request,
        mut res: Response,
        renderers: &[Arc<dyn Renderer>],
    ) -> Result<Response, Error> {
        if self.logs(req.method()) {
            let data = res.data().map(ToString::to_string).unwrap_or_default();
            tracing::debug!("{} <Response> {} {}", head(req), res.status_line(), data);
        }
        match Negotiator.select_renderer(renderers, req.format()) {
            Ok(renderer) => res.render(&**renderer)?,
            Err(err) => {
                tracing::debug!(request = %head(req), error = %err, "renderer negotiation failed");
                res = Response::from(err);
                res.render(&JsonRenderer)?;
            }
        }
        Ok(res)
    }

    fn fall_back(&self, method: Method) -> bool {
        self.head_fallback && method == Method::Head
    }

    fn logs(&self, method: Method) -> bool {
        self.logger_methods.contains(&method)
    }
}

/// `[GET /todos?page=2]`
fn head(req: &Request) -> String {
    let query = req.query();
    let separator = if query.is_empty() { "" } else { "?" };
    format!("[{} {}{separator}{query}]", req.method(), req.path())
}
