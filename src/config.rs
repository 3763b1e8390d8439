//! Process-wide configuration.
//!
//! Built once at startup and passed by reference into the [`Api`](crate::Api).
//! Nothing reads configuration from ambient global state.
//!
//! Files use the upper-case knob names and override only what they set:
//!
//! ```toml
//! MIDDLEWARE_CLASSES = ["cors"]
//! CORS_ALLOW_ORIGIN = "https://app.example.com"
//! CORS_ALLOW_CREDENTIALS = true
//!
//! [ACTION_MAP]
//! GET = "fetch"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::method::Method;

/// Environment variable naming a TOML file read by [`Config::from_env`].
pub const CONFIG_ENV_VAR: &str = "RESTKIT_CONFIG";

/// Mapping from HTTP method to action name.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct ActionMap(BTreeMap<Method, String>);

impl ActionMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets the action for `method`. Returns `self` for chaining.
    pub fn with(mut self, method: Method, action: impl Into<String>) -> Self {
        self.0.insert(method, action.into());
        self
    }

    pub fn get(&self, method: Method) -> Option<&str> {
        self.0.get(&method).map(String::as_str)
    }

    /// The methods that have a mapping, in method order.
    pub fn methods(&self) -> Vec<Method> {
        self.0.keys().copied().collect()
    }

    /// A copy of `self` with every entry in `overrides` applied on top.
    pub fn merged(&self, overrides: &ActionMap) -> ActionMap {
        let mut map = self.0.clone();
        map.extend(overrides.0.iter().map(|(m, a)| (*m, a.clone())));
        Self(map)
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        Self::new()
            .with(Method::Post, "create")
            .with(Method::Get, "read")
            .with(Method::Put, "replace")
            .with(Method::Patch, "update")
            .with(Method::Delete, "delete")
            .with(Method::Options, "options")
            .with(Method::Head, "head")
            .with(Method::Trace, "trace")
    }
}

impl<S: Into<String>> FromIterator<(Method, S)> for ActionMap {
    fn from_iter<I: IntoIterator<Item = (Method, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(m, a)| (m, a.into())).collect())
    }
}

/// Every knob the framework reads.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    /// Method → action name used by every route unless overridden.
    pub action_map: ActionMap,
    /// Registry names of the default parsers, in negotiation order.
    pub parser_classes: Vec<String>,
    /// Registry names of the default renderers; the first is the fallback.
    pub renderer_classes: Vec<String>,
    /// Registry names of the global middleware, outermost first.
    pub middleware_classes: Vec<String>,

    pub cors_allow_origin: String,
    pub cors_allow_credentials: bool,
    pub cors_allow_methods: Vec<String>,
    /// Empty means any: preflights echo `Access-Control-Request-Headers`.
    pub cors_allow_headers: Vec<String>,
    pub cors_max_age: u64,

    pub logger_enabled: bool,
    /// A `tracing_subscriber::EnvFilter` directive, e.g. `"info"`.
    pub logger_level: String,
    /// Methods whose request and response bodies are logged at debug level.
    pub logger_methods: Vec<Method>,

    /// Serve HEAD with the GET action when HEAD is unmapped or unimplemented.
    pub head_fallback_to_get: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            action_map: ActionMap::default(),
            parser_classes: vec!["json".into(), "urlencoded".into(), "multipart".into()],
            renderer_classes: vec!["json".into()],
            middleware_classes: Vec::new(),
            cors_allow_origin: "*".into(),
            cors_allow_credentials: false,
            cors_allow_methods: ["GET", "POST", "PUT", "PATCH", "DELETE"]
                .into_iter()
                .map(String::from)
                .collect(),
            cors_allow_headers: Vec::new(),
            cors_max_age: 864_000,
            logger_enabled: true,
            logger_level: "info".into(),
            logger_methods: vec![Method::Get, Method::Post, Method::Put, Method::Patch, Method::Delete],
            head_fallback_to_get: false,
        }
    }
}

impl Config {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Loads the file named by `RESTKIT_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let config = Config::from_toml_str(
            r#"
            MIDDLEWARE_CLASSES = ["cors"]
            CORS_MAX_AGE = 60
            LOGGER_METHODS = ["POST"]

            [ACTION_MAP]
            GET = "fetch"
            "#,
        )
        .unwrap();

        assert_eq!(config.middleware_classes, vec!["cors"]);
        assert_eq!(config.cors_max_age, 60);
        assert_eq!(config.logger_methods, vec![Method::Post]);
        assert_eq!(config.action_map.get(Method::Get), Some("fetch"));
        assert_eq!(config.action_map.get(Method::Post), None);
        assert_eq!(config.renderer_classes, vec!["json"]);
        assert_eq!(config.cors_allow_origin, "*");
    }

    #[test]
    fn unknown_method_in_action_map_is_rejected() {
        let err = Config::from_toml_str("[ACTION_MAP]\nFETCH = \"x\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn merged_overrides_single_entries() {
        let list = ActionMap::default().merged(&ActionMap::new().with(Method::Get, "index"));
        assert_eq!(list.get(Method::Get), Some("index"));
        assert_eq!(list.get(Method::Post), Some("create"));
        assert_eq!(list.methods().len(), 8);
    }
}
