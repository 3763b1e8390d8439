//! Parser and renderer selection.
//!
//! Negotiation is deliberately narrow: parsers match the request
//! `Content-Type` exactly (parameters ignored) and renderers match the
//! format suffix from the URI. The `Accept` header is not consulted; a
//! format is a routable resource, so an unknown suffix is a 404.

use std::sync::Arc;

use crate::error::{ErrorKind, HttpError};
use crate::parsers::Parser;
use crate::renderers::Renderer;

/// Strips parameters from a media type: `"application/json; charset=utf-8"`
/// becomes `"application/json"`.
pub fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or("").trim()
}

/// Stateless selector for parsers and renderers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Negotiator;

impl Negotiator {
    /// The first parser whose media type equals `content_type` once
    /// parameters are stripped.
    pub fn select_parser<'a>(
        &self,
        parsers: &'a [Arc<dyn Parser>],
        content_type: &str,
    ) -> Result<&'a Arc<dyn Parser>, HttpError> {
        let wanted = media_type(content_type);
        parsers
            .iter()
            .find(|p| p.content_type().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                HttpError::unsupported_media_type(format!(
                    "Unsupported media type \"{wanted}\" in request."
                ))
            })
    }

    /// The renderer for `format_suffix`, or the first renderer when no
    /// suffix was given.
    pub fn select_renderer<'a>(
        &self,
        renderers: &'a [Arc<dyn Renderer>],
        format_suffix: Option<&str>,
    ) -> Result<&'a Arc<dyn Renderer>, HttpError> {
        match format_suffix {
            Some(suffix) => renderers
                .iter()
                .find(|r| r.format_suffix() == suffix)
                .ok_or_else(|| HttpError::from(ErrorKind::NotFound)),
            None => renderers.first().ok_or_else(|| HttpError::from(ErrorKind::NotAcceptable)),
        }
    }
}
