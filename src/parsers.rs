//! Request-body parsers.
//!
//! A parser is a stateless codec keyed by the exact media type it accepts.
//! The [`Negotiator`](crate::Negotiator) picks one per request; an empty body
//! never reaches a parser at all.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::HttpError;

/// Files uploaded in a multipart body, keyed by form field name.
pub type Files = HashMap<String, UploadedFile>;

/// One uploaded file, fully buffered.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: Bytes,
}

/// What a parser produces: structured data plus any uploaded files.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parsed {
    pub data: Value,
    pub files: Files,
}

impl Parsed {
    /// Data only, no files.
    pub fn data(data: Value) -> Self {
        Self { data, files: Files::new() }
    }
}

/// A request-body codec.
#[async_trait]
pub trait Parser: Send + Sync {
    /// The media type this parser accepts, without parameters.
    fn content_type(&self) -> &str;

    /// Parse `body`. `content_type` is the full header value, parameters
    /// included, so parsers can read e.g. a multipart boundary.
    async fn parse(
        &self,
        body: Bytes,
        content_type: &str,
        content_length: Option<u64>,
    ) -> Result<Parsed, HttpError>;
}

/// `application/json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonParser;

#[async_trait]
impl Parser for JsonParser {
    fn content_type(&self) -> &str { "application/json" }

    async fn parse(&self, body: Bytes, _: &str, _: Option<u64>) -> Result<Parsed, HttpError> {
        serde_json::from_slice(&body)
            .map(Parsed::data)
            .map_err(|_| HttpError::bad_request("JSON data is invalid"))
    }
}

/// `application/x-www-form-urlencoded`, parsed into a string map. When a
/// key repeats, the first value wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct UrlEncodedParser;

#[async_trait]
impl Parser for UrlEncodedParser {
    fn content_type(&self) -> &str { "application/x-www-form-urlencoded" }

    async fn parse(&self, body: Bytes, _: &str, _: Option<u64>) -> Result<Parsed, HttpError> {
        let mut map = Map::new();
        for (k, v) in url::form_urlencoded::parse(&body) {
            map.entry(k.into_owned()).or_insert_with(|| Value::String(v.into_owned()));
        }
        Ok(Parsed::data(Value::Object(map)))
    }
}

/// `multipart/form-data`. Text fields land in the data map, file fields in
/// [`Files`]. A repeated field name keeps its first part.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiPartParser;

#[async_trait]
impl Parser for MultiPartParser {
    fn content_type(&self) -> &str { "multipart/form-data" }

    async fn parse(&self, body: Bytes, content_type: &str, _: Option<u64>) -> Result<Parsed, HttpError> {
        let boundary = multer::parse_boundary(content_type).map_err(|_| {
            HttpError::bad_request("Multipart data missing boundary in Content-Type header")
        })?;
        let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut data = Map::new();
        let mut files = Files::new();
        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match field.file_name().map(str::to_owned) {
                Some(filename) => {
                    let content_type = field.content_type().map(|m| m.to_string());
                    let content = field.bytes().await.map_err(invalid)?;
                    files
                        .entry(name)
                        .or_insert(UploadedFile { filename: Some(filename), content_type, content });
                }
                None => {
                    let text = field.text().await.map_err(invalid)?;
                    data.entry(name).or_insert(Value::String(text));
                }
            }
        }
        Ok(Parsed { data: Value::Object(data), files })
    }
}

fn invalid(_: multer::Error) -> HttpError {
    HttpError::bad_request("Multipart data is invalid")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn json_parser() {
        let parsed = JsonParser
            .parse(Bytes::from_static(br#"{"hello": "world"}"#), "application/json", None)
            .await
            .unwrap();
        assert_eq!(parsed.data, json!({"hello": "world"}));
        assert!(parsed.files.is_empty());
    }

    #[tokio::test]
    async fn invalid_json_is_a_bad_request() {
        let err = JsonParser
            .parse(Bytes::from_static(b"{nope"), "application/json", None)
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 400);
        assert_eq!(err.detail(), "JSON data is invalid");
    }

    #[tokio::test]
    async fn urlencoded_parser() {
        let parsed = UrlEncodedParser
            .parse(Bytes::from_static(b"hello=world&x=a+b"), "application/x-www-form-urlencoded", None)
            .await
            .unwrap();
        assert_eq!(parsed.data, json!({"hello": "world", "x": "a b"}));
    }

    #[tokio::test]
    async fn repeated_form_keys_keep_the_first_value() {
        let parsed = UrlEncodedParser
            .parse(Bytes::from_static(b"tag=a&tag=b&x=1"), "application/x-www-form-urlencoded", None)
            .await
            .unwrap();
        assert_eq!(parsed.data, json!({"tag": "a", "x": "1"}));
    }

    #[tokio::test]
    async fn multipart_parser_splits_fields_and_files() {
        let body = concat!(
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"text\"\r\n\r\n",
            "this is some text\r\n",
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"test.txt\"\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "this is the file\r\n",
            "--XyZ--\r\n",
        );
        let parsed = MultiPartParser
            .parse(Bytes::from_static(body.as_bytes()), "multipart/form-data; boundary=XyZ", None)
            .await
            .unwrap();

        assert_eq!(parsed.data, json!({"text": "this is some text"}));
        let file = &parsed.files["file"];
        assert_eq!(file.filename.as_deref(), Some("test.txt"));
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));
        assert_eq!(file.content, Bytes::from_static(b"this is the file"));
    }

    #[tokio::test]
    async fn multipart_without_boundary_is_a_bad_request() {
        let err = MultiPartParser
            .parse(Bytes::from_static(b"x"), "multipart/form-data", None)
            .await
            .unwrap_err();
        assert_eq!(err.detail(), "Multipart data missing boundary in Content-Type header");
    }
}
