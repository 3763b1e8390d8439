//! Response-body renderers.

use bytes::Bytes;
use serde_json::Value;

use crate::error::Error;

/// A response-body codec, selected by format suffix.
pub trait Renderer: Send + Sync {
    /// Set as the response `Content-Type`.
    fn content_type(&self) -> &str;

    /// The URI suffix that selects this renderer, e.g. `json` for `/todos.json`.
    fn format_suffix(&self) -> &str;

    fn render(&self, data: &Value) -> Result<Bytes, Error>;
}

/// `application/json`, compact output.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn content_type(&self) -> &str { "application/json" }
    fn format_suffix(&self) -> &str { "json" }

    fn render(&self, data: &Value) -> Result<Bytes, Error> {
        Ok(serde_json::to_vec(data)?.into())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::parsers::{JsonParser, Parser};

    #[test]
    fn renders_compact_json() {
        let body = JsonRenderer.render(&json!({"message": "Method not allowed."})).unwrap();
        assert_eq!(&body[..], br#"{"message":"Method not allowed."}"#);
    }

    #[tokio::test]
    async fn json_survives_render_then_parse() {
        let values = [
            json!(null),
            json!(true),
            json!(-17),
            json!(2.5),
            json!(""),
            json!("snow ☃ \"quoted\""),
            json!([1, "two", [3.0], {"four": null}]),
            json!({"nested": {"list": [], "map": {}}, "id": 7}),
        ];
        for value in values {
            let body = JsonRenderer.render(&value).unwrap();
            let parsed = JsonParser.parse(body, "application/json", None).await.unwrap();
            assert_eq!(parsed.data, value);
        }
    }
}
