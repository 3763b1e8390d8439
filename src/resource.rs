//! Resources: named bundles of actions.
//!
//! A resource names its actions explicitly. The dispatcher looks the action
//! up by the name the action map assigns to the request method; a name the
//! resource never registered is answered with `405 Method Not Allowed`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{Action, BoxedAction};
use crate::middleware::Middleware;
use crate::parsers::Parser;
use crate::renderers::Renderer;

/// A named group of actions bound to a URI prefix.
///
/// ```rust
/// use restkit::{Request, Resource};
/// use serde_json::{Value, json};
///
/// async fn index(_: Request) -> Value { json!([]) }
/// async fn create(req: Request) -> (Value, u16) { (req.data().clone(), 201) }
///
/// let todos = Resource::new("todos").index(index).create(create);
/// assert!(todos.implements("index"));
/// assert!(!todos.implements("delete"));
/// ```
pub struct Resource {
    name: String,
    actions: HashMap<String, BoxedAction>,
    parsers: Option<Vec<Arc<dyn Parser>>>,
    renderers: Option<Vec<Arc<dyn Renderer>>>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: HashMap::new(),
            parsers: None,
            renderers: None,
            middleware: Vec::new(),
        }
    }

    pub fn name(&self) -> &str { &self.name }

    /// Registers `action` under `name`. Later registrations replace earlier
    /// ones. Custom names become reachable through an action-map override.
    pub fn action(mut self, name: impl Into<String>, action: impl Action) -> Self {
        self.actions.insert(name.into(), action.into_boxed_action());
        self
    }

    // ── Conventional actions ─────────────────────────────────────────────────

    pub fn index(self, action: impl Action) -> Self   { self.action("index", action) }
    pub fn create(self, action: impl Action) -> Self  { self.action("create", action) }
    pub fn read(self, action: impl Action) -> Self    { self.action("read", action) }
    pub fn replace(self, action: impl Action) -> Self { self.action("replace", action) }
    pub fn update(self, action: impl Action) -> Self  { self.action("update", action) }
    pub fn delete(self, action: impl Action) -> Self  { self.action("delete", action) }
    pub fn options(self, action: impl Action) -> Self { self.action("options", action) }
    pub fn head(self, action: impl Action) -> Self    { self.action("head", action) }
    pub fn trace(self, action: impl Action) -> Self   { self.action("trace", action) }

    // ── Per-resource components ──────────────────────────────────────────────

    /// Replaces the configured parsers for this resource only.
    pub fn parsers(mut self, parsers: Vec<Arc<dyn Parser>>) -> Self {
        self.parsers = Some(parsers);
        self
    }

    /// Replaces the configured renderers for this resource only.
    pub fn renderers(mut self, renderers: Vec<Arc<dyn Renderer>>) -> Self {
        self.renderers = Some(renderers);
        self
    }

    /// Appends a middleware that runs after the global ones.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn implements(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    pub(crate) fn get_action(&self, action: &str) -> Option<&BoxedAction> {
        self.actions.get(action)
    }

    pub(crate) fn own_parsers(&self) -> Option<&[Arc<dyn Parser>]> {
        self.parsers.as_deref()
    }

    pub(crate) fn own_renderers(&self) -> Option<&[Arc<dyn Renderer>]> {
        self.renderers.as_deref()
    }

    pub(crate) fn own_middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut actions: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        actions.sort_unstable();
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("actions", &actions)
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}
