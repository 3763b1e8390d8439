//! Middleware layer.
//!
//! A middleware intercepts a request before its action runs and the
//! response after. Global middleware (from `MIDDLEWARE_CLASSES`) wraps
//! resource-level middleware:
//!
//! ```text
//! request  ─▶ A.process_request ─▶ B.process_request ─▶ C.process_request ─▶ action
//! response ◀─ A.process_response ◀─ B.process_response ◀─ C.process_response ◀─┘
//! ```
//!
//! The first `process_request` returning `Some(reply)` stops the chain and
//! the action never runs. Every `process_response` still runs.
//!
//! An [`HttpError`](crate::HttpError) raised by a hook or an action skips
//! every `process_response`. Error responses therefore carry no headers a
//! middleware would add, CORS headers included; a browser making a
//! cross-origin call sees such a response as a network failure. Actions
//! that need their client errors readable cross-origin can return a
//! [`Response`] with the error status instead of an `Err`.

pub mod cors;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::request::Request;
use crate::response::{Reply, Response};

pub use cors::CorsMiddleware;

/// A request/response interceptor. Both hooks are optional.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Runs before the action. `Some(reply)` short-circuits.
    async fn process_request(&self, _req: &mut Request) -> Result<Option<Reply>, Error> {
        Ok(None)
    }

    /// Runs after the action with the normalized response.
    async fn process_response(&self, _req: &Request, res: Response) -> Result<Response, Error> {
        Ok(res)
    }
}

/// The ordered middleware for one dispatch: global first, then the
/// resource's own.
pub(crate) struct Chain<'a> {
    layers: Vec<&'a Arc<dyn Middleware>>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(global: &'a [Arc<dyn Middleware>], local: &'a [Arc<dyn Middleware>]) -> Self {
        Self { layers: global.iter().chain(local).collect() }
    }

    pub(crate) async fn before(&self, req: &mut Request) -> Result<Option<Reply>, Error> {
        for layer in &self.layers {
            if let Some(reply) = layer.process_request(req).await? {
                return Ok(Some(reply));
            }
        }
        Ok(None)
    }

    pub(crate) async fn after(&self, req: &Request, mut res: Response) -> Result<Response, Error> {
        for layer in self.layers.iter().rev() {
            res = layer.process_response(req, res).await?;
        }
        Ok(res)
    }
}
