//! Terse `key: value` rendering of structured examples.
//!
//! `{"name": "Kari", "tags": ["a", "b"], "address": {"city": "Oslo"}}`
//! renders as `name: Kari, tags: [a, b], address{city: Oslo}`.

use serde_json::{Map, Value};

/// Renders a mapping in shorthand notation, keys in document order.
#[must_use]
pub fn render(object: &Map<String, Value>) -> String {
    object
        .iter()
        .map(|(key, value)| match value {
            Value::Object(nested) => format!("{key}{{{}}}", render(nested)),
            other => format!("{key}: {}", render_value(other)),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => render_string(s),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(render_value).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(nested) => format!("{{{}}}", render(nested)),
    }
}

/// Strings stay bare unless they would read back as another type or
/// contain shorthand punctuation.
fn render_string(s: &str) -> String {
    let ambiguous = s.is_empty()
        || s.trim() != s
        || matches!(s, "true" | "false" | "null")
        || s.parse::<f64>().is_ok()
        || s.contains([',', ':', '{', '}', '[', ']', '"']);

    if ambiguous {
        Value::String(s.to_string()).to_string()
    } else {
        s.to_string()
    }
}
