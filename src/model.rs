//! Compiled command model: parameters, operations and the API that owns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Where a parameter travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Header,
}

impl Location {
    /// Parses the `in` field of a parameter object. Cookie and unknown
    /// locations have no counterpart in the command model.
    #[must_use]
    pub fn from_openapi(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ScalarType {
    /// Maps a JSON schema `type` to a scalar kind; anything else is carried as text.
    #[must_use]
    pub fn from_schema_type(value: &str) -> Self {
        match value {
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            _ => Self::String,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Type of a parameter value: one scalar, or a list of scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamType {
    Scalar(ScalarType),
    Array(ScalarType),
}

impl ParamType {
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    #[must_use]
    pub const fn element(&self) -> ScalarType {
        match self {
            Self::Scalar(t) | Self::Array(t) => *t,
        }
    }
}

impl Default for ParamType {
    fn default() -> Self {
        Self::Scalar(ScalarType::String)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(t) => f.write_str(t.as_str()),
            Self::Array(t) => write!(f, "array[{}]", t.as_str()),
        }
    }
}

impl FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scalar = |name: &str| match name {
            "string" | "integer" | "number" | "boolean" => Ok(ScalarType::from_schema_type(name)),
            other => Err(format!("unknown parameter type '{other}'")),
        };

        match s.strip_prefix("array[").and_then(|rest| rest.strip_suffix(']')) {
            Some(element) => scalar(element).map(Self::Array),
            None => scalar(s).map(Self::Scalar),
        }
    }
}

impl TryFrom<String> for ParamType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        value.to_string()
    }
}

/// Multi-value encoding convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Simple,
    Form,
}

/// One compiled request input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    /// Wire name, unique within its location for one operation
    pub name: String,
    /// Locally exposed flag or argument name, when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: Location,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub style: Style,
    pub explode: bool,
    pub required: bool,
    /// Declared default; drives wire-value suppression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Documentation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Param {
    /// Name the command line exposes for this parameter.
    #[must_use]
    pub fn option_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// One invocable API action. Immutable once compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub long: String,
    pub method: String,
    /// Absolute URI with one `{name}` placeholder per path parameter
    pub uri_template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header_params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_media_type: Option<String>,
    /// Request body examples in shorthand form, used for usage text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl Operation {
    #[must_use]
    pub const fn accepts_body(&self) -> bool {
        self.body_media_type.is_some()
    }

    /// True when `name` is this operation's name or one of its aliases.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }
}

/// The compiled result of one description document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Api {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub operations: Vec<Operation>,
    /// When the source description should be fetched again
    pub cache_until: DateTime<Utc>,
}

impl Api {
    /// Finds an operation by name or alias.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.answers_to(name))
    }

    /// Operations that should be listed in help output.
    pub fn visible_operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| !op.hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_display_and_parse() {
        let array = ParamType::Array(ScalarType::Integer);
        assert_eq!(array.to_string(), "array[integer]");
        assert_eq!("array[integer]".parse::<ParamType>().unwrap(), array);
        assert_eq!(
            "boolean".parse::<ParamType>().unwrap(),
            ParamType::Scalar(ScalarType::Boolean)
        );
        assert!("array[object".parse::<ParamType>().is_err());
    }

    #[test]
    fn test_param_type_serializes_as_string() {
        let json = serde_json::to_value(ParamType::Array(ScalarType::String)).unwrap();
        assert_eq!(json, serde_json::json!("array[string]"));
    }

    #[test]
    fn test_location_from_openapi() {
        assert_eq!(Location::from_openapi("path"), Some(Location::Path));
        assert_eq!(Location::from_openapi("cookie"), None);
    }
}
