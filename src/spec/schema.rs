//! Human-readable rendering of JSON schemas for command help text.
//!
//! ```text
//! {
//!   id: (integer format:int64) Unique identifier
//!   name*: (string minLength:1)
//!   tags: [
//!     (string)
//!   ]
//! }
//! ```

use super::{reference_name, reference_of};
use crate::error::Error;
use serde_json::Value;
use std::fmt::Write as _;

/// Which side of the exchange a schema is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Request bodies: `readOnly` properties are left out.
    Write,
    /// Responses: `writeOnly` properties are left out.
    Read,
}

/// Validation keywords shown next to scalar types.
const TAG_KEYWORDS: &[&str] = &[
    "format",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "default",
];

/// Renders a schema; references are followed, recursive ones print their name.
///
/// # Errors
///
/// Returns `Error::DescriptionParse` when a reference cannot be resolved.
pub fn render(document: &Value, schema: &Value, mode: Mode) -> Result<String, Error> {
    let mut renderer = Renderer {
        document,
        mode,
        stack: Vec::new(),
    };
    renderer.render(schema, "")
}

struct Renderer<'a> {
    document: &'a Value,
    mode: Mode,
    /// References currently being expanded
    stack: Vec<&'a str>,
}

impl<'a> Renderer<'a> {
    fn render(&mut self, schema: &'a Value, indent: &str) -> Result<String, Error> {
        if let Some(reference) = reference_of(schema) {
            if self.stack.contains(&reference) {
                return Ok(format!("<recursive ref {}>", reference_name(reference)));
            }
            let target = super::lookup(self.document, reference)?;
            self.stack.push(reference);
            let rendered = self.render(target, indent);
            self.stack.pop();
            return rendered;
        }

        for combinator in ["allOf", "oneOf", "anyOf"] {
            if let Some(Value::Array(variants)) = schema.get(combinator) {
                return self.render_combinator(combinator, variants, indent);
            }
        }

        match schema_type(schema) {
            Some("object") => self.render_object(schema, indent),
            Some("array") => self.render_array(schema, indent),
            None if schema.get("properties").is_some() => self.render_object(schema, indent),
            None if schema.get("items").is_some() => self.render_array(schema, indent),
            other => Ok(render_scalar(schema, other.unwrap_or("any"))),
        }
    }

    fn render_object(&mut self, schema: &'a Value, indent: &str) -> Result<String, Error> {
        let inner = format!("{indent}  ");
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut out = String::from("{\n");
        if let Some(Value::Object(properties)) = schema.get("properties") {
            for (name, property) in properties {
                let resolved = super::resolve(self.document, property)?;
                if self.is_hidden(resolved) {
                    continue;
                }
                let marker = if required.contains(&name.as_str()) { "*" } else { "" };
                let rendered = self.render(property, &inner)?;
                let _ = writeln!(out, "{inner}{name}{marker}: {rendered}");
            }
        }

        match schema.get("additionalProperties") {
            Some(extra @ Value::Object(_)) => {
                let rendered = self.render(extra, &inner)?;
                let _ = writeln!(out, "{inner}<any>: {rendered}");
            }
            Some(Value::Bool(true)) => {
                let _ = writeln!(out, "{inner}<any>: (any)");
            }
            _ => {}
        }

        out.push_str(indent);
        out.push('}');
        Ok(out)
    }

    fn render_array(&mut self, schema: &'a Value, indent: &str) -> Result<String, Error> {
        let inner = format!("{indent}  ");
        let items = match schema.get("items") {
            Some(items) => self.render(items, &inner)?,
            None => "(any)".to_string(),
        };
        Ok(format!("[\n{inner}{items}\n{indent}]"))
    }

    fn render_combinator(
        &mut self,
        combinator: &str,
        variants: &'a [Value],
        indent: &str,
    ) -> Result<String, Error> {
        let inner = format!("{indent}  ");
        let mut out = format!("{combinator}{{\n");
        for variant in variants {
            let rendered = self.render(variant, &inner)?;
            let _ = writeln!(out, "{inner}{rendered}");
        }
        out.push_str(indent);
        out.push('}');
        Ok(out)
    }

    fn is_hidden(&self, property: &Value) -> bool {
        let flag = |key: &str| property.get(key).and_then(Value::as_bool).unwrap_or(false);
        match self.mode {
            Mode::Write => flag("readOnly"),
            Mode::Read => flag("writeOnly"),
        }
    }
}

/// The schema's `type`, taking the first non-null entry of a 3.1 type list.
pub(crate) fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(t) => Some(t),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn render_scalar(schema: &Value, type_name: &str) -> String {
    let mut tags = vec![type_name.to_string()];
    if schema.get("nullable").and_then(Value::as_bool).unwrap_or(false) {
        tags.push("nullable:true".to_string());
    }
    for keyword in TAG_KEYWORDS {
        if let Some(value) = schema.get(*keyword) {
            tags.push(format!("{keyword}:{}", plain(value)));
        }
    }
    if let Some(Value::Array(options)) = schema.get("enum") {
        let options: Vec<String> = options.iter().map(plain).collect();
        tags.push(format!("enum:{}", options.join(",")));
    }

    let mut out = format!("({})", tags.join(" "));
    if let Some(description) = schema.get("description").and_then(Value::as_str) {
        let description = description.trim();
        if !description.is_empty() {
            out.push(' ');
            out.push_str(&description.replace('\n', " "));
        }
    }
    out
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
