//! Route table.
//!
//! Routes are stored in an arena and addressed by endpoint name. Paths are
//! matched by two radix trees: one for plain patterns and one for patterns
//! registered with a format suffix. A path whose last segment looks like
//! `name.ext` is tried against the suffixed tree first with `ext` stripped
//! and exposed as the `format` parameter.
//!
//! Several routes may share a pattern as long as their endpoints differ;
//! each tree leaf holds every route registered for that pattern.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::config::ActionMap;
use crate::error::{Error, ErrorKind, HttpError};
use crate::method::Method;
use crate::resource::Resource;

// ── Options ──────────────────────────────────────────────────────────────────

/// Whether a route also answers with a `.{format}` suffix.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FormatSuffix {
    /// Only the plain pattern.
    #[default]
    Disabled,
    /// Both the plain and the suffixed pattern.
    Optional,
    /// Only the suffixed pattern.
    Mandatory,
}

impl FromStr for FormatSuffix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled"  => Ok(Self::Disabled),
            "optional"  => Ok(Self::Optional),
            "mandatory" => Ok(Self::Mandatory),
            _           => Err(Error::InvalidFormatSuffix(s.to_owned())),
        }
    }
}

/// Options for [`Router::route`]. Unset fields derive from the resource.
#[derive(Clone, Debug, Default)]
pub struct RouteOptions {
    /// Defaults to `/{name}`.
    pub uri: Option<String>,
    /// Defaults to the resource name.
    pub endpoint: Option<String>,
    /// Defaults to every method in the action map.
    pub methods: Option<Vec<Method>>,
    /// Entries applied on top of the default action map.
    pub actions: Option<ActionMap>,
    pub format_suffix: FormatSuffix,
}

/// Options for [`Router::register_collection`].
#[derive(Clone, Debug)]
pub struct CollectionOptions {
    /// Defaults to `/{name}`.
    pub prefix: Option<String>,
    /// Appended to the prefix for the item route. Converters are allowed,
    /// e.g. `{pk:int}`.
    pub pk: String,
    /// Applied on top of `GET → index` for the list route.
    pub list_actions: Option<ActionMap>,
    pub item_actions: Option<ActionMap>,
    pub format_suffix: FormatSuffix,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            pk: "{pk}".into(),
            list_actions: None,
            item_actions: None,
            format_suffix: FormatSuffix::Disabled,
        }
    }
}

// ── Converters ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Converter {
    Int,
    Float,
    Str,
}

impl Converter {
    fn accepts(self, value: &str) -> bool {
        match self {
            Self::Int   => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            Self::Float => value.contains('.') && value.parse::<f64>().is_ok(),
            Self::Str   => true,
        }
    }
}

/// Rewrites `{name:conv}` placeholders to matchit's `{name}` and collects
/// the converters.
fn compile(pattern: &str) -> Result<(String, Vec<(String, Converter)>), Error> {
    let mut out = String::with_capacity(pattern.len());
    let mut converters = Vec::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let Some(len) = rest[open..].find('}') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let close = open + len;
        match rest[open + 1..close].split_once(':') {
            Some((name, conv)) => {
                let converter = match conv {
                    "int"            => Converter::Int,
                    "float"          => Converter::Float,
                    "str" | "string" => Converter::Str,
                    _ => {
                        return Err(Error::UnknownConverter {
                            pattern: pattern.to_owned(),
                            converter: conv.to_owned(),
                        });
                    }
                };
                converters.push((name.to_owned(), converter));
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
            None => out.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Ok((out, converters))
}

// ── Route ────────────────────────────────────────────────────────────────────

/// One registered route.
#[derive(Debug)]
pub struct Route {
    endpoint: String,
    pattern: String,
    methods: BTreeSet<Method>,
    resource: Arc<Resource>,
    action_map: ActionMap,
    converters: Vec<(String, Converter)>,
}

impl Route {
    pub fn endpoint(&self) -> &str { &self.endpoint }

    /// The pattern as registered, e.g. `/todos/{pk:int}.{format}`.
    pub fn pattern(&self) -> &str { &self.pattern }

    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ { self.methods.iter().copied() }
    pub fn allows(&self, method: Method) -> bool { self.methods.contains(&method) }
    pub fn resource(&self) -> &Arc<Resource> { &self.resource }

    /// The configured map with this route's overrides applied.
    pub fn action_map(&self) -> &ActionMap { &self.action_map }

    fn accepts(&self, params: &HashMap<String, String>) -> bool {
        self.converters
            .iter()
            .all(|(name, conv)| params.get(name).is_some_and(|v| conv.accepts(v)))
    }
}

/// A resolved route plus the parameters extracted from the path.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

// ── Router ───────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Tree {
    matcher: MatchitRouter<usize>,
    /// Leaf id → indices into `Router::routes`.
    leaves: Vec<Vec<usize>>,
    /// Compiled pattern → leaf id.
    index: HashMap<String, usize>,
}

impl Tree {
    fn insert(&mut self, pattern: &str, compiled: String, route: usize) -> Result<(), Error> {
        if let Some(&leaf) = self.index.get(&compiled) {
            self.leaves[leaf].push(route);
            return Ok(());
        }
        let leaf = self.leaves.len();
        self.matcher
            .insert(compiled.clone(), leaf)
            .map_err(|source| Error::InvalidRoute { pattern: pattern.to_owned(), source })?;
        self.leaves.push(vec![route]);
        self.index.insert(compiled, leaf);
        Ok(())
    }
}

/// The application route table.
///
/// Build it once at startup through the [`Api`](crate::Api); it is
/// read-only while serving.
pub struct Router {
    default_actions: ActionMap,
    head_fallback: bool,
    routes: Vec<Route>,
    endpoints: HashMap<String, usize>,
    plain: Tree,
    suffixed: Tree,
}

impl Router {
    /// A router whose routes start from `default_actions`.
    pub fn new(default_actions: ActionMap) -> Self {
        Self {
            default_actions,
            head_fallback: false,
            routes: Vec::new(),
            endpoints: HashMap::new(),
            plain: Tree::default(),
            suffixed: Tree::default(),
        }
    }

    /// Let `HEAD` through on routes that allow `GET`.
    pub fn head_fallback(mut self, enabled: bool) -> Self {
        self.head_fallback = enabled;
        self
    }

    /// Registers one route.
    ///
    /// `methods` defaults to every method in the default action map;
    /// `actions` entries are applied on top of that map. Fails with
    /// [`Error::DuplicateEndpoint`] if `endpoint` is taken.
    pub fn add_route(
        &mut self,
        resource: impl Into<Arc<Resource>>,
        pattern: &str,
        endpoint: &str,
        methods: Option<&[Method]>,
        actions: Option<&ActionMap>,
    ) -> Result<(), Error> {
        self.insert(resource.into(), pattern, endpoint, methods, actions, false)
    }

    /// Registers a route in the shape `suffix` asks for: plain as
    /// `pattern`/`endpoint`, suffixed as `pattern.{format}`/`endpoint_format`.
    pub fn add_route_with_format_suffix(
        &mut self,
        resource: impl Into<Arc<Resource>>,
        pattern: &str,
        endpoint: &str,
        methods: Option<&[Method]>,
        actions: Option<&ActionMap>,
        suffix: FormatSuffix,
    ) -> Result<(), Error> {
        let resource = resource.into();
        let suffixed_endpoint = format!("{endpoint}_format");
        let wanted = match suffix {
            FormatSuffix::Disabled  => vec![endpoint],
            FormatSuffix::Optional  => vec![endpoint, suffixed_endpoint.as_str()],
            FormatSuffix::Mandatory => vec![suffixed_endpoint.as_str()],
        };
        self.ensure_free(&wanted)?;

        self.atomically(|router| {
            if suffix != FormatSuffix::Mandatory {
                router.insert(resource.clone(), pattern, endpoint, methods, actions, false)?;
            }
            if suffix != FormatSuffix::Disabled {
                router.insert(resource, pattern, &suffixed_endpoint, methods, actions, true)?;
            }
            Ok(())
        })
    }

    /// Registers a single resource at `/{name}` under endpoint `{name}`
    /// unless `options` say otherwise.
    pub fn route(&mut self, resource: impl Into<Arc<Resource>>, options: RouteOptions) -> Result<(), Error> {
        let resource = resource.into();
        let uri = options.uri.unwrap_or_else(|| format!("/{}", resource.name()));
        let endpoint = options.endpoint.unwrap_or_else(|| resource.name().to_owned());
        self.add_route_with_format_suffix(
            resource,
            &uri,
            &endpoint,
            options.methods.as_deref(),
            options.actions.as_ref(),
            options.format_suffix,
        )
    }

    /// Registers a plural resource as two routes:
    ///
    /// - `{name}_list` at the prefix: `OPTIONS`, `GET` (→ `index`), `POST`
    /// - `{name}_item` at `prefix/pk`: `OPTIONS`, `GET`, `PUT`, `PATCH`, `DELETE`
    ///
    /// `OPTIONS` is always allowed so CORS preflights reach the middleware.
    pub fn register_collection(
        &mut self,
        resource: impl Into<Arc<Resource>>,
        options: CollectionOptions,
    ) -> Result<(), Error> {
        let resource = resource.into();
        let name = resource.name().to_owned();
        let prefix = options.prefix.unwrap_or_else(|| format!("/{name}"));
        let (list, item) = (format!("{name}_list"), format!("{name}_item"));

        let mut wanted = vec![list.clone(), item.clone()];
        if options.format_suffix != FormatSuffix::Disabled {
            wanted.extend([format!("{list}_format"), format!("{item}_format")]);
        }
        self.ensure_free(&wanted)?;

        let mut list_actions = ActionMap::new().with(Method::Get, "index");
        if let Some(overrides) = &options.list_actions {
            list_actions = list_actions.merged(overrides);
        }
        let item_pattern = format!("{prefix}/{}", options.pk);
        self.atomically(|router| {
            router.add_route_with_format_suffix(
                resource.clone(),
                &prefix,
                &list,
                Some(&[Method::Options, Method::Get, Method::Post]),
                Some(&list_actions),
                options.format_suffix,
            )?;
            router.add_route_with_format_suffix(
                resource,
                &item_pattern,
                &item,
                Some(&[Method::Options, Method::Get, Method::Put, Method::Patch, Method::Delete]),
                options.item_actions.as_ref(),
                options.format_suffix,
            )
        })
    }

    /// Resolves a path and method to a route.
    ///
    /// `path` is percent-decoded before matching, so parameters come out
    /// decoded. A path that matches no pattern is `404`; one that matches
    /// only routes not allowing `method` is `405` with an `Allow` header.
    pub fn resolve(&self, path: &str, method: Method) -> Result<RouteMatch<'_>, HttpError> {
        let decoded = decode_path(path);
        let path = decoded.as_ref();
        let mut allowed = BTreeSet::new();

        if let Some((stem, format)) = split_format(path) {
            if let Some(found) = self.lookup(&self.suffixed, stem, method, &mut allowed) {
                let (route, mut params) = found;
                params.insert("format".to_owned(), format.to_owned());
                return Ok(RouteMatch { route, params });
            }
        }
        if let Some((route, params)) = self.lookup(&self.plain, path, method, &mut allowed) {
            return Ok(RouteMatch { route, params });
        }

        if allowed.is_empty() {
            return Err(ErrorKind::NotFound.into());
        }
        let allow: Vec<&str> = allowed.into_iter().map(Method::as_str).collect();
        Err(HttpError::from(ErrorKind::MethodNotAllowed).with_header("allow", &allow.join(", ")))
    }

    fn lookup<'a>(
        &'a self,
        tree: &Tree,
        path: &str,
        method: Method,
        allowed: &mut BTreeSet<Method>,
    ) -> Option<(&'a Route, HashMap<String, String>)> {
        let matched = tree.matcher.at(path).ok()?;
        let params: HashMap<String, String> = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();

        for &idx in &tree.leaves[*matched.value] {
            let route = &self.routes[idx];
            if !route.accepts(&params) {
                continue;
            }
            if route.allows(method)
                || (self.head_fallback && method == Method::Head && route.allows(Method::Get))
            {
                return Some((route, params));
            }
            allowed.extend(route.methods());
        }
        None
    }

    pub fn get(&self, endpoint: &str) -> Option<&Route> {
        self.endpoints.get(endpoint).map(|&idx| &self.routes[idx])
    }

    /// Routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }

    /// Runs `register`, restoring the table to its prior state if it fails
    /// part way through.
    fn atomically(&mut self, register: impl FnOnce(&mut Self) -> Result<(), Error>) -> Result<(), Error> {
        let routes = self.routes.len();
        let endpoints = self.endpoints.clone();
        let (plain, suffixed) = (self.plain.clone(), self.suffixed.clone());

        let result = register(self);
        if result.is_err() {
            self.routes.truncate(routes);
            self.endpoints = endpoints;
            self.plain = plain;
            self.suffixed = suffixed;
        }
        result
    }

    fn ensure_free<S: AsRef<str>>(&self, endpoints: &[S]) -> Result<(), Error> {
        match endpoints.iter().find(|e| self.endpoints.contains_key(e.as_ref())) {
            Some(taken) => Err(Error::DuplicateEndpoint(taken.as_ref().to_owned())),
            None => Ok(()),
        }
    }

    fn insert(
        &mut self,
        resource: Arc<Resource>,
        pattern: &str,
        endpoint: &str,
        methods: Option<&[Method]>,
        actions: Option<&ActionMap>,
        suffixed: bool,
    ) -> Result<(), Error> {
        self.ensure_free(&[endpoint])?;

        let (compiled, converters) = compile(pattern)?;
        let methods: BTreeSet<Method> = match methods {
            Some(methods) => methods.iter().copied().collect(),
            None => self.default_actions.methods().into_iter().collect(),
        };
        let action_map = match actions {
            Some(overrides) => self.default_actions.merged(overrides),
            None => self.default_actions.clone(),
        };
        let shown = if suffixed { format!("{pattern}.{{format}}") } else { pattern.to_owned() };

        let idx = self.routes.len();
        let tree = if suffixed { &mut self.suffixed } else { &mut self.plain };
        tree.insert(&shown, compiled, idx)?;

        tracing::debug!(endpoint, pattern = %shown, ?methods, "route registered");
        self.routes.push(Route {
            endpoint: endpoint.to_owned(),
            pattern: shown,
            methods,
            resource,
            action_map,
            converters,
        });
        self.endpoints.insert(endpoint.to_owned(), idx);
        Ok(())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.routes.iter().map(|r| (&r.endpoint, &r.pattern))).finish()
    }
}

/// Percent-decodes a request path. Sequences that do not decode to UTF-8
/// leave the path as received.
pub(crate) fn decode_path(path: &str) -> Cow<'_, str> {
    if !path.contains('%') {
        return Cow::Borrowed(path);
    }
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

/// `/todos/1.json` → `("/todos/1", "json")`. Only the last segment counts.
fn split_format(path: &str) -> Option<(&str, &str)> {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let dot = segment_start + path[segment_start..].rfind('.')?;
    let (stem, ext) = (&path[..dot], &path[dot + 1..]);
    (dot > segment_start && !ext.is_empty()).then_some((stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::new(ActionMap::default())
    }

    fn todos() -> Arc<Resource> {
        Arc::new(Resource::new("todos"))
    }

    fn endpoints(router: &Router) -> Vec<&str> {
        router.routes().map(Route::endpoint).collect()
    }

    #[test]
    fn add_route_defaults_to_every_mapped_method() {
        let mut r = router();
        r.add_route(todos(), "/todos", "todos", None, None).unwrap();
        let route = r.get("todos").unwrap();
        assert_eq!(route.methods().count(), 8);
        assert_eq!(route.action_map().get(Method::Get), Some("read"));
    }

    #[test]
    fn duplicate_endpoint_fails_whatever_the_uri() {
        let mut r = router();
        r.add_route(todos(), "/todos", "todos", None, None).unwrap();
        let err = r.add_route(todos(), "/other", "todos", None, None).unwrap_err();
        assert!(matches!(err, Error::DuplicateEndpoint(ref e) if e == "todos"));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn collection_creates_list_and_item_routes() {
        let mut r = router();
        r.register_collection(todos(), CollectionOptions::default()).unwrap();
        assert_eq!(endpoints(&r), ["todos_list", "todos_item"]);

        let list = r.get("todos_list").unwrap();
        assert_eq!(list.pattern(), "/todos");
        assert_eq!(list.methods().collect::<Vec<_>>(), [Method::Get, Method::Options, Method::Post]);
        assert_eq!(list.action_map().get(Method::Get), Some("index"));
        assert_eq!(list.action_map().get(Method::Post), Some("create"));

        let item = r.get("todos_item").unwrap();
        assert_eq!(item.pattern(), "/todos/{pk}");
        for m in [Method::Get, Method::Put, Method::Patch, Method::Delete, Method::Options] {
            assert!(item.allows(m));
        }
        assert_eq!(item.action_map().get(Method::Get), Some("read"));
    }

    #[test]
    fn collection_refuses_partial_registration() {
        let mut r = router();
        r.add_route(todos(), "/legacy", "todos_item", None, None).unwrap();
        assert!(r.register_collection(todos(), CollectionOptions::default()).is_err());
        assert!(r.get("todos_list").is_none());
    }

    #[test]
    fn conflicting_item_pattern_rolls_back_the_list_route() {
        let mut r = router();
        r.add_route(todos(), "/todos/{id}", "other", None, None).unwrap();

        let err = r.register_collection(todos(), CollectionOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidRoute { ref pattern, .. } if pattern == "/todos/{pk}"));
        assert_eq!(endpoints(&r), ["other"]);
        assert!(r.get("todos_list").is_none());
        assert_eq!(r.resolve("/todos", Method::Get).unwrap_err().kind(), ErrorKind::NotFound);

        r.add_route(todos(), "/todos", "todos_list", None, None).unwrap();
        assert_eq!(r.resolve("/todos", Method::Get).unwrap().route.endpoint(), "todos_list");
        assert_eq!(r.resolve("/todos/3", Method::Get).unwrap().route.endpoint(), "other");
    }

    #[test]
    fn optional_suffix_rolls_back_the_plain_route() {
        let mut r = router();
        r.add_route_with_format_suffix(todos(), "/a/{id}", "a", None, None, FormatSuffix::Mandatory)
            .unwrap();

        let err = r
            .add_route_with_format_suffix(todos(), "/a/{pk}", "b", None, None, FormatSuffix::Optional)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRoute { .. }));
        assert_eq!(endpoints(&r), ["a_format"]);
        assert!(r.resolve("/a/1", Method::Get).is_err());
    }

    #[test]
    fn path_is_percent_decoded_before_matching() {
        let mut r = router();
        r.add_route(Resource::new("files"), "/files/{name}", "file", Some(&[Method::Get]), None)
            .unwrap();
        r.add_route(Resource::new("cafe"), "/café", "cafe", Some(&[Method::Get]), None).unwrap();

        let m = r.resolve("/files/a%20b", Method::Get).unwrap();
        assert_eq!(m.params["name"], "a b");
        assert_eq!(r.resolve("/caf%C3%A9", Method::Get).unwrap().route.endpoint(), "cafe");
        assert_eq!(r.resolve("/files/%FF", Method::Get).unwrap().params["name"], "%FF");
    }

    #[test]
    fn format_suffix_modes() {
        let mut r = router();
        r.add_route_with_format_suffix(todos(), "/a", "a", None, None, FormatSuffix::Disabled).unwrap();
        r.add_route_with_format_suffix(todos(), "/b", "b", None, None, FormatSuffix::Optional).unwrap();
        r.add_route_with_format_suffix(todos(), "/c", "c", None, None, FormatSuffix::Mandatory).unwrap();
        assert_eq!(endpoints(&r), ["a", "b", "b_format", "c_format"]);
        assert_eq!(r.get("c_format").unwrap().pattern(), "/c.{format}");
    }

    #[test]
    fn format_suffix_parses_from_str() {
        assert_eq!("optional".parse::<FormatSuffix>().unwrap(), FormatSuffix::Optional);
        assert!(matches!("sometimes".parse::<FormatSuffix>(), Err(Error::InvalidFormatSuffix(_))));
    }

    #[test]
    fn resolves_params_and_format() {
        let mut r = router();
        r.register_collection(
            todos(),
            CollectionOptions { format_suffix: FormatSuffix::Optional, ..Default::default() },
        )
        .unwrap();

        let m = r.resolve("/todos/7", Method::Get).unwrap();
        assert_eq!(m.route.endpoint(), "todos_item");
        assert_eq!(m.params["pk"], "7");

        let m = r.resolve("/todos/7.json", Method::Get).unwrap();
        assert_eq!(m.route.endpoint(), "todos_item_format");
        assert_eq!(m.params["pk"], "7");
        assert_eq!(m.params["format"], "json");

        let m = r.resolve("/todos.json", Method::Post).unwrap();
        assert_eq!(m.route.endpoint(), "todos_list_format");
    }

    #[test]
    fn dotted_value_falls_back_to_plain_route() {
        let mut r = router();
        r.add_route(Resource::new("files"), "/files/{name}", "file", Some(&[Method::Get]), None)
            .unwrap();
        let m = r.resolve("/files/report.pdf", Method::Get).unwrap();
        assert_eq!(m.params["name"], "report.pdf");
        assert!(!m.params.contains_key("format"));
    }

    #[test]
    fn converters_filter_matches() {
        let mut r = router();
        r.register_collection(todos(), CollectionOptions { pk: "{pk:int}".into(), ..Default::default() })
            .unwrap();
        assert_eq!(r.get("todos_item").unwrap().pattern(), "/todos/{pk:int}");
        assert!(r.resolve("/todos/12", Method::Get).is_ok());
        let err = r.resolve("/todos/abc", Method::Get).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = r.add_route(todos(), "/x/{id:uuid}", "x", None, None).unwrap_err();
        assert!(matches!(err, Error::UnknownConverter { ref converter, .. } if converter == "uuid"));
    }

    #[test]
    fn wrong_method_is_405_with_allow() {
        let mut r = router();
        r.register_collection(todos(), CollectionOptions::default()).unwrap();
        let err = r.resolve("/todos", Method::Delete).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MethodNotAllowed);
        assert_eq!(err.headers()["allow"], "GET, OPTIONS, POST");

        let err = r.resolve("/nothing", Method::Get).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn head_fallback_lets_head_reach_get_routes() {
        let mut r = router().head_fallback(true);
        r.register_collection(todos(), CollectionOptions::default()).unwrap();
        assert!(r.resolve("/todos/1", Method::Head).is_ok());
    }

    #[test]
    fn routes_may_share_a_pattern() {
        let mut r = router();
        r.add_route(todos(), "/todos", "read_todos", Some(&[Method::Get]), None).unwrap();
        r.add_route(todos(), "/todos", "write_todos", Some(&[Method::Post]), None).unwrap();
        assert_eq!(r.resolve("/todos", Method::Post).unwrap().route.endpoint(), "write_todos");
    }
}
