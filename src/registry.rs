//! Name → component lookup for the `*_CLASSES` configuration knobs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ComponentKind, Error};
use crate::middleware::{CorsMiddleware, Middleware};
use crate::parsers::{JsonParser, MultiPartParser, Parser, UrlEncodedParser};
use crate::renderers::{JsonRenderer, Renderer};

type MiddlewareFactory = Arc<dyn Fn(&Config) -> Arc<dyn Middleware> + Send + Sync>;

/// Components the configuration can name.
///
/// Built-ins: parsers `json`, `urlencoded`, `multipart`; renderer `json`;
/// middleware `cors`. Middleware is registered as a factory so it can read
/// its own knobs from the [`Config`].
///
/// ```rust
/// use restkit::{Config, CorsMiddleware, Registry};
///
/// let registry = Registry::with_builtins()
///     .middleware("strict-cors", |c: &Config| CorsMiddleware::from_config(c));
/// let names = vec!["strict-cors".to_owned()];
/// assert_eq!(registry.resolve_middleware(&names, &Config::default()).unwrap().len(), 1);
/// ```
pub struct Registry {
    parsers: HashMap<String, Arc<dyn Parser>>,
    renderers: HashMap<String, Arc<dyn Renderer>>,
    middleware: HashMap<String, MiddlewareFactory>,
}

impl Registry {
    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self { parsers: HashMap::new(), renderers: HashMap::new(), middleware: HashMap::new() }
    }

    pub fn with_builtins() -> Self {
        Self::empty()
            .parser("json", JsonParser)
            .parser("urlencoded", UrlEncodedParser)
            .parser("multipart", MultiPartParser)
            .renderer("json", JsonRenderer)
            .middleware("cors", CorsMiddleware::from_config)
    }

    pub fn parser(mut self, name: impl Into<String>, parser: impl Parser + 'static) -> Self {
        self.parsers.insert(name.into(), Arc::new(parser));
        self
    }

    pub fn renderer(mut self, name: impl Into<String>, renderer: impl Renderer + 'static) -> Self {
        self.renderers.insert(name.into(), Arc::new(renderer));
        self
    }

    pub fn middleware<F, M>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Config) -> M + Send + Sync + 'static,
        M: Middleware + 'static,
    {
        let factory: MiddlewareFactory =
            Arc::new(move |config: &Config| -> Arc<dyn Middleware> { Arc::new(factory(config)) });
        self.middleware.insert(name.into(), factory);
        self
    }

    pub fn resolve_parsers(&self, names: &[String]) -> Result<Vec<Arc<dyn Parser>>, Error> {
        names
            .iter()
            .map(|name| lookup(&self.parsers, ComponentKind::Parser, name).cloned())
            .collect()
    }

    pub fn resolve_renderers(&self, names: &[String]) -> Result<Vec<Arc<dyn Renderer>>, Error> {
        names
            .iter()
            .map(|name| lookup(&self.renderers, ComponentKind::Renderer, name).cloned())
            .collect()
    }

    /// Instantiates each named middleware against `config`, in order.
    pub fn resolve_middleware(
        &self,
        names: &[String],
        config: &Config,
    ) -> Result<Vec<Arc<dyn Middleware>>, Error> {
        names
            .iter()
            .map(|name| lookup(&self.middleware, ComponentKind::Middleware, name).map(|f| f(config)))
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self { Self::with_builtins() }
}

fn lookup<'a, T>(table: &'a HashMap<String, T>, kind: ComponentKind, name: &str) -> Result<&'a T, Error> {
    table
        .get(name)
        .ok_or_else(|| Error::UnknownComponent { kind, name: name.to_owned() })
}
