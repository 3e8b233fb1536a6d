//! Decoded HTTP responses as handed to link discovery and output.

use crate::constants;
use crate::error::Error;
use crate::links::Links;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    /// Lowercase header names; repeated headers are joined with `", "`
    pub headers: IndexMap<String, String>,
    pub body: Value,
    #[serde(skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: IndexMap<String, String>, body: Value) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
            links: Links::new(),
        }
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(constants::HEADER_CONTENT_TYPE_LC)
    }
}

/// Decodes a body by content type: JSON, YAML, else the text as a string.
/// An empty body decodes to `null`.
///
/// # Errors
///
/// Returns `Error::Json` or `Error::Yaml` when the body does not match the
/// declared content type.
pub fn decode_body(content_type: Option<&str>, text: &str) -> Result<Value, Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    if content_type.contains(constants::CONTENT_TYPE_IDENTIFIER_JSON) {
        return Ok(serde_json::from_str(text)?);
    }
    if content_type.contains(constants::CONTENT_TYPE_IDENTIFIER_YAML) {
        return crate::spec::parser::yaml_to_value(text);
    }

    Ok(Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = IndexMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = Response::new(200, headers, Value::Null);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.content_type(), Some("application/json"));
    }

    #[test]
    fn test_decode_body_by_content_type() {
        assert_eq!(
            decode_body(Some("application/hal+json"), r#"{"a": 1}"#).unwrap(),
            json!({"a": 1})
        );
        assert_eq!(
            decode_body(Some("application/yaml"), "a: 1\nb: [x]").unwrap(),
            json!({"a": 1, "b": ["x"]})
        );
        assert_eq!(decode_body(Some("text/plain"), "hi").unwrap(), json!("hi"));
        assert_eq!(decode_body(None, "").unwrap(), Value::Null);
        assert!(decode_body(Some("application/json"), "{oops").is_err());
    }
}
