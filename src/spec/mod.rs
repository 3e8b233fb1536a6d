//! API description documents: parsing, reference resolution and compilation
//!
//! Documents are handled as a generic decoded tree (`serde_json::Value`) and
//! read defensively: optional fields that are missing or of an unexpected
//! shape are treated as absent. Only the `x-cli-*` extensions are strict,
//! since a wrong payload there would silently change the command surface.

pub mod compiler;
pub mod parser;
pub mod resolver;
pub mod schema;
pub mod shorthand;

pub use compiler::{compile, FetchMetadata, OperationCompiler};
pub use parser::{detect, parse_document};
pub use resolver::{EntrypointResolver, Resolver};

use crate::error::Error;
use serde_json::Value;
use std::collections::HashSet;

/// HTTP methods a path item may define, in the order operations are emitted.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "head", "options", "trace",
];

/// Maximum depth for resolving references to prevent stack overflow
pub const MAX_REFERENCE_DEPTH: usize = 10;

/// Returns the target of a `$ref` string, or `None` if the value is inline.
#[must_use]
pub fn reference_of(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

/// Follows `$ref` chains until an inline value is reached.
///
/// # Errors
///
/// Returns `Error::DescriptionParse` if a reference is not local, points
/// nowhere, is part of a cycle, or the chain is deeper than
/// [`MAX_REFERENCE_DEPTH`].
pub fn resolve<'a>(document: &'a Value, value: &'a Value) -> Result<&'a Value, Error> {
    let mut visited = HashSet::new();
    let mut current = value;

    while let Some(reference) = reference_of(current) {
        if visited.len() >= MAX_REFERENCE_DEPTH {
            return Err(Error::description_parse(format!(
                "Maximum reference depth ({MAX_REFERENCE_DEPTH}) exceeded while resolving '{reference}'"
            )));
        }
        if !visited.insert(reference) {
            return Err(Error::description_parse(format!(
                "Circular reference detected: '{reference}' is part of a reference cycle"
            )));
        }
        current = lookup(document, reference)?;
    }

    Ok(current)
}

/// Looks up a local JSON pointer reference such as `#/components/schemas/Pet`.
///
/// # Errors
///
/// Returns `Error::DescriptionParse` for external or dangling references.
pub fn lookup<'a>(document: &'a Value, reference: &str) -> Result<&'a Value, Error> {
    let pointer = reference.strip_prefix('#').ok_or_else(|| {
        Error::description_parse(format!(
            "External reference '{reference}' is not supported; only '#/...' references are"
        ))
    })?;

    document.pointer(pointer).ok_or_else(|| {
        Error::description_parse(format!("Reference '{reference}' does not point to anything"))
    })
}

/// Last segment of a reference, used as a display name for schemas.
#[must_use]
pub fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Reads an optional string field, treating other shapes as absent.
#[must_use]
pub fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Reads an optional boolean extension.
///
/// # Errors
///
/// Returns `Error::DescriptionParse` if the extension is present but not a boolean.
pub fn ext_bool(value: &Value, key: &str, location: &str) -> Result<bool, Error> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(bad_extension(key, location, "a boolean", other)),
    }
}

/// Reads an optional string extension; empty strings count as absent.
///
/// # Errors
///
/// Returns `Error::DescriptionParse` if the extension is present but not a string.
pub fn ext_str(value: &Value, key: &str, location: &str) -> Result<Option<String>, Error> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(bad_extension(key, location, "a string", other)),
    }
}

/// Reads an optional list-of-strings extension.
///
/// # Errors
///
/// Returns `Error::DescriptionParse` if the extension is present but not a list of strings.
pub fn ext_str_list(value: &Value, key: &str, location: &str) -> Result<Vec<String>, Error> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| bad_extension(key, location, "a list of strings", item))
            })
            .collect(),
        Some(other) => Err(bad_extension(key, location, "a list of strings", other)),
    }
}

fn bad_extension(key: &str, location: &str, expected: &str, found: &Value) -> Error {
    Error::description_parse(format!(
        "Cannot read extension {key} on {location}: expected {expected}, found {found}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_follows_chain() {
        let doc = json!({
            "components": {
                "parameters": {
                    "limit": {"$ref": "#/components/parameters/pageSize"},
                    "pageSize": {"name": "limit", "in": "query"}
                }
            }
        });
        let start = json!({"$ref": "#/components/parameters/limit"});
        let resolved = resolve(&doc, &start).unwrap();
        assert_eq!(resolved["name"], "limit");
    }

    #[test]
    fn test_resolve_detects_cycle() {
        let doc = json!({
            "components": {
                "schemas": {
                    "A": {"$ref": "#/components/schemas/B"},
                    "B": {"$ref": "#/components/schemas/A"}
                }
            }
        });
        let start = json!({"$ref": "#/components/schemas/A"});
        let err = resolve(&doc, &start).unwrap_err();
        assert!(err.to_string().contains("Circular reference"));
    }

    #[test]
    fn test_lookup_rejects_external_reference() {
        let doc = json!({});
        assert!(lookup(&doc, "common.yaml#/components/schemas/Pet").is_err());
        assert!(lookup(&doc, "#/components/schemas/Missing").is_err());
    }

    #[test]
    fn test_extension_readers() {
        let op = json!({
            "x-cli-hidden": true,
            "x-cli-name": "",
            "x-cli-aliases": ["ls", "list"],
            "x-cli-ignore": "yes"
        });
        assert!(ext_bool(&op, "x-cli-hidden", "op").unwrap());
        assert_eq!(ext_str(&op, "x-cli-name", "op").unwrap(), None);
        assert_eq!(ext_str_list(&op, "x-cli-aliases", "op").unwrap(), vec!["ls", "list"]);
        assert!(ext_bool(&op, "x-cli-ignore", "op").is_err());
        assert!(!ext_bool(&op, "x-cli-missing", "op").unwrap());
    }

    #[test]
    fn test_reference_name() {
        assert_eq!(reference_name("#/components/schemas/Pet"), "Pet");
    }
}
