//! Cross-origin resource sharing.

use async_trait::async_trait;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS,
    ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};

use crate::config::Config;
use crate::error::Error;
use crate::method::Method;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::{Reply, Response};

/// Answers preflight requests itself and stamps `Access-Control-Allow-*`
/// headers onto every other response.
///
/// Built from the `CORS_*` knobs:
///
/// ```rust
/// use restkit::{Config, CorsMiddleware};
///
/// let config = Config {
///     cors_allow_origin: "https://app.example.com".into(),
///     cors_allow_credentials: true,
///     ..Config::default()
/// };
/// let cors = CorsMiddleware::from_config(&config);
/// assert_eq!(cors.allow_origin(), "https://app.example.com");
/// ```
#[derive(Clone, Debug)]
pub struct CorsMiddleware {
    allow_origin: String,
    allow_credentials: bool,
    allow_methods: Vec<String>,
    allow_headers: Vec<String>,
    max_age: u64,
}

impl CorsMiddleware {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allow_origin: config.cors_allow_origin.clone(),
            allow_credentials: config.cors_allow_credentials,
            allow_methods: config.cors_allow_methods.clone(),
            allow_headers: config.cors_allow_headers.clone(),
            max_age: config.cors_max_age,
        }
    }

    pub fn allow_origin(&self) -> &str { &self.allow_origin }

    /// `OPTIONS` carrying both `Origin` and `Access-Control-Request-Method`.
    pub fn is_preflight(req: &Request) -> bool {
        req.method() == Method::Options
            && req.headers().contains_key(ORIGIN)
            && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
    }

    fn preflight(&self, req: &Request) -> Response {
        let mut res = Response::empty();
        res.set_header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str(), &self.allow_origin);
        res.set_header(ACCESS_CONTROL_ALLOW_METHODS.as_str(), &self.allow_methods.join(", "));
        res.set_header(ACCESS_CONTROL_MAX_AGE.as_str(), &self.max_age.to_string());

        // No configured list means any header the client asks for.
        let allow_headers = if self.allow_headers.is_empty() {
            req.header(ACCESS_CONTROL_REQUEST_HEADERS.as_str()).unwrap_or("").to_owned()
        } else {
            self.allow_headers.join(", ")
        };
        if !allow_headers.is_empty() {
            res.set_header(ACCESS_CONTROL_ALLOW_HEADERS.as_str(), &allow_headers);
        }

        self.stamp_credentials(&mut res);
        res
    }

    fn stamp_credentials(&self, res: &mut Response) {
        if self.allow_credentials {
            res.set_header(ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str(), "true");
        }
        if self.allow_origin != "*" {
            res.set_header(VARY.as_str(), "Origin");
        }
    }
}

impl Default for CorsMiddleware {
    fn default() -> Self { Self::from_config(&Config::default()) }
}

#[async_trait]
impl Middleware for CorsMiddleware {
    async fn process_request(&self, req: &mut Request) -> Result<Option<Reply>, Error> {
        if Self::is_preflight(req) {
            tracing::debug!(path = req.path(), "answering CORS preflight");
            return Ok(Some(self.preflight(req).into()));
        }
        Ok(None)
    }

    async fn process_response(&self, req: &Request, mut res: Response) -> Result<Response, Error> {
        if !Self::is_preflight(req) {
            res.set_header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str(), &self.allow_origin);
            self.stamp_credentials(&mut res);
        }
        Ok(res)
    }
}
