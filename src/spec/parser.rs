use crate::constants;
use crate::error::Error;
use serde_json::{Map, Number, Value};

/// Parses a JSON or YAML description document into a generic tree.
///
/// YAML mapping keys that are not strings (unquoted `200:` status codes,
/// booleans) are converted to their textual form so the tree stays a plain
/// JSON value. Key order is preserved.
///
/// # Errors
///
/// Returns `Error::DescriptionParse` if the content is neither valid JSON nor
/// valid YAML, or if it is not an `OpenAPI` 3.x document.
pub fn parse_document(content: &str) -> Result<Value, Error> {
    let trimmed = content.trim_start();
    let document = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed)
            .map_err(|e| Error::description_parse(format!("Invalid JSON document: {e}")))?
    } else {
        let yaml: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| Error::description_parse(format!("Invalid YAML document: {e}")))?;
        yaml_to_json(yaml)?
    };

    check_version(&document)?;
    Ok(document)
}

fn check_version(document: &Value) -> Result<(), Error> {
    let Some(root) = document.as_object() else {
        return Err(Error::description_parse(
            "Document root must be a mapping".to_string(),
        ));
    };

    match root.get("openapi") {
        Some(Value::String(version)) if version.starts_with('3') => Ok(()),
        Some(Value::Number(version)) if version.as_f64().is_some_and(|v| (3.0..4.0).contains(&v)) => {
            Ok(())
        }
        Some(other) => Err(Error::description_parse(format!(
            "Unsupported OpenAPI version {other}; only 3.x documents are supported"
        ))),
        None => Err(Error::description_parse(
            "Missing 'openapi' version field".to_string(),
        )),
    }
}

/// Decodes arbitrary YAML text (response bodies) into a generic tree.
///
/// # Errors
///
/// Returns `Error::Yaml` for invalid YAML, `Error::DescriptionParse` for
/// mapping keys with no textual form.
pub fn yaml_to_value(text: &str) -> Result<Value, Error> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    yaml_to_json(yaml)
}

/// Converts a YAML tree into a JSON tree.
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, Error> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                object.insert(yaml_key(key)?, yaml_to_json(item)?);
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, Error> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(Error::description_parse(format!(
            "Unsupported mapping key in YAML document: {other:?}"
        ))),
    }
}

/// Decides whether a fetched resource looks like an `OpenAPI` 3 description.
///
/// The content type is checked first; the body is only scanned for a
/// version marker when the header says nothing.
#[must_use]
pub fn detect(content_type: Option<&str>, body: &str) -> bool {
    if content_type.is_some_and(|ct| ct.starts_with(constants::CONTENT_TYPE_OPENAPI_PREFIX)) {
        return true;
    }

    body.contains("openapi: 3")
        || body.contains("openapi: \"3")
        || body.contains("openapi: '3")
        || body.contains(r#""openapi":"3"#)
        || body.contains(r#""openapi": "3"#)
}
