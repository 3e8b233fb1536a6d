//! Parameter serialization: typed runtime values to wire strings and back.

use crate::error::Error;
use crate::model::{Param, ParamType, ScalarType, Style};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A value bound to a parameter for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Array(Vec<ParamValue>),
}

impl ParamValue {
    /// The zero value of a type: empty text, 0, false or an empty list.
    #[must_use]
    pub const fn zero(param_type: ParamType) -> Self {
        match param_type {
            ParamType::Array(_) => Self::Array(Vec::new()),
            ParamType::Scalar(ScalarType::String) => Self::String(String::new()),
            ParamType::Scalar(ScalarType::Integer) => Self::Integer(0),
            ParamType::Scalar(ScalarType::Number) => Self::Number(0.0),
            ParamType::Scalar(ScalarType::Boolean) => Self::Boolean(false),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Integer(i) => *i == 0,
            Self::Number(n) => *n == 0.0,
            Self::Boolean(b) => !b,
            Self::Array(items) => items.is_empty(),
        }
    }

    /// Converts a document value (a declared default) into a typed value.
    ///
    /// Returns `None` when the document value does not fit the type.
    #[must_use]
    pub fn from_json(param_type: ParamType, value: &Value) -> Option<Self> {
        match (param_type, value) {
            (ParamType::Array(element), Value::Array(items)) => items
                .iter()
                .map(|item| Self::from_json(ParamType::Scalar(element), item))
                .collect::<Option<Vec<_>>>()
                .map(Self::Array),
            (ParamType::Scalar(ScalarType::String), Value::String(s)) => Some(Self::String(s.clone())),
            (ParamType::Scalar(ScalarType::Integer), Value::Number(n)) => n.as_i64().map(Self::Integer),
            (ParamType::Scalar(ScalarType::Number), Value::Number(n)) => n.as_f64().map(Self::Number),
            (ParamType::Scalar(ScalarType::Boolean), Value::Bool(b)) => Some(Self::Boolean(*b)),
            _ => None,
        }
    }

    /// Structural comparison against a declared default.
    ///
    /// Integers and floats compare by numeric value; any other kind
    /// mismatch is simply unequal.
    #[must_use]
    pub fn equals_json(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String(s), Value::String(other)) => s == other,
            (Self::Boolean(b), Value::Bool(other)) => b == other,
            (Self::Integer(i), Value::Number(n)) => n
                .as_i64()
                .map_or_else(|| n.as_f64() == Some(*i as f64), |other| other == *i),
            (Self::Number(f), Value::Number(n)) => n.as_f64() == Some(*f),
            (Self::Array(items), Value::Array(others)) => {
                items.len() == others.len()
                    && items.iter().zip(others).all(|(item, other)| item.equals_json(other))
            }
            _ => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Array(items) => f.write_str(&join(items)),
        }
    }
}

fn join(items: &[ParamValue]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Serializes a bound value into wire strings.
///
/// Scalars produce one string. Arrays produce one comma-joined string, except
/// `form` style with `explode` which produces one string per element.
#[must_use]
pub fn serialize(param: &Param, value: &ParamValue) -> Vec<String> {
    match value {
        ParamValue::Array(items) => match (param.style, param.explode) {
            (Style::Form, true) => items.iter().map(ToString::to_string).collect(),
            (Style::Form, false) | (Style::Simple, _) => vec![join(items)],
        },
        scalar => vec![scalar.to_string()],
    }
}

/// Parses command-line text into a value of the parameter's type.
///
/// # Errors
///
/// Returns `Error::ParameterParse` naming the parameter and the offending
/// text when the input does not match the declared type.
pub fn parse(param: &Param, raw: &str) -> Result<ParamValue, Error> {
    match param.param_type {
        ParamType::Scalar(scalar) => parse_scalar(param, scalar, raw),
        ParamType::Array(element) => {
            if raw.is_empty() {
                return Ok(ParamValue::Array(Vec::new()));
            }
            raw.split(',')
                .map(|part| parse_scalar(param, element, part.trim()))
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Array)
        }
    }
}

/// Parses every occurrence of a repeated flag, flattening comma lists.
///
/// # Errors
///
/// Returns `Error::ParameterParse` for the first element that fails to parse.
pub fn parse_many<'a>(
    param: &Param,
    raws: impl IntoIterator<Item = &'a str>,
) -> Result<ParamValue, Error> {
    let mut items = Vec::new();
    for raw in raws {
        match parse(param, raw)? {
            ParamValue::Array(parsed) => items.extend(parsed),
            scalar => items.push(scalar),
        }
    }
    if param.param_type.is_array() {
        Ok(ParamValue::Array(items))
    } else {
        Ok(items
            .pop()
            .unwrap_or_else(|| ParamValue::zero(param.param_type)))
    }
}

fn parse_scalar(param: &Param, scalar: ScalarType, raw: &str) -> Result<ParamValue, Error> {
    match scalar {
        ScalarType::String => Ok(ParamValue::String(raw.to_string())),
        ScalarType::Integer => raw
            .parse::<i64>()
            .map(ParamValue::Integer)
            .map_err(|e| Error::parameter_parse(&param.name, raw, e)),
        ScalarType::Number => raw
            .parse::<f64>()
            .map(ParamValue::Number)
            .map_err(|e| Error::parameter_parse(&param.name, raw, e)),
        ScalarType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(ParamValue::Boolean(true)),
            "false" | "0" => Ok(ParamValue::Boolean(false)),
            _ => Err(Error::parameter_parse(
                &param.name,
                raw,
                "expected true or false",
            )),
        },
    }
}

/// Whether a bound value should be left out of the outgoing request.
///
/// With a declared default the value is omitted when it equals the default;
/// without one it is omitted when it is the type's zero value.
#[must_use]
pub fn is_suppressed(param: &Param, value: &ParamValue) -> bool {
    param
        .default
        .as_ref()
        .map_or_else(|| value.is_zero(), |default| value.equals_json(default))
}

/// Value a parameter takes when the user supplies nothing.
#[must_use]
pub fn initial_value(param: &Param) -> ParamValue {
    param
        .default
        .as_ref()
        .and_then(|default| ParamValue::from_json(param.param_type, default))
        .unwrap_or_else(|| ParamValue::zero(param.param_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;
    use serde_json::json;

    fn param(param_type: ParamType, style: Style, explode: bool) -> Param {
        Param {
            name: "tag".to_string(),
            display_name: None,
            description: None,
            location: Location::Query,
            param_type,
            style,
            explode,
            required: false,
            default: None,
            example: None,
        }
    }

    fn tags() -> ParamValue {
        ParamValue::Array(vec![
            ParamValue::String("a".to_string()),
            ParamValue::String("b".to_string()),
            ParamValue::String("c".to_string()),
        ])
    }

    #[test]
    fn test_form_explode_yields_one_entry_per_element() {
        let p = param(ParamType::Array(ScalarType::String), Style::Form, true);
        assert_eq!(serialize(&p, &tags()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_form_without_explode_joins() {
        let p = param(ParamType::Array(ScalarType::String), Style::Form, false);
        assert_eq!(serialize(&p, &tags()), vec!["a,b,c"]);
    }

    #[test]
    fn test_simple_style_ignores_explode() {
        for explode in [true, false] {
            let p = param(ParamType::Array(ScalarType::String), Style::Simple, explode);
            assert_eq!(serialize(&p, &tags()), vec!["a,b,c"]);
        }
    }

    #[test]
    fn test_scalar_canonical_text() {
        let p = param(ParamType::Scalar(ScalarType::Number), Style::Form, true);
        assert_eq!(serialize(&p, &ParamValue::Number(2.5)), vec!["2.5"]);
        assert_eq!(serialize(&p, &ParamValue::Number(3.0)), vec!["3"]);
        assert_eq!(serialize(&p, &ParamValue::Boolean(true)), vec!["true"]);
    }

    #[test]
    fn test_parse_integer_error_names_param() {
        let p = param(ParamType::Scalar(ScalarType::Integer), Style::Simple, false);
        let err = parse(&p, "abc").unwrap_err();
        match err {
            Error::ParameterParse { name, input, .. } => {
                assert_eq!(name, "tag");
                assert_eq!(input, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_array_of_integers() {
        let p = param(ParamType::Array(ScalarType::Integer), Style::Form, true);
        assert_eq!(
            parse(&p, "1, 2,3").unwrap(),
            ParamValue::Array(vec![
                ParamValue::Integer(1),
                ParamValue::Integer(2),
                ParamValue::Integer(3)
            ])
        );
        assert_eq!(parse(&p, "").unwrap(), ParamValue::Array(vec![]));
    }

    #[test]
    fn test_parse_many_flattens_repeats() {
        let p = param(ParamType::Array(ScalarType::String), Style::Form, true);
        assert_eq!(parse_many(&p, ["a,b", "c"]).unwrap(), tags());
    }

    #[test]
    fn test_suppression_with_default() {
        let mut p = param(ParamType::Scalar(ScalarType::Integer), Style::Form, true);
        p.default = Some(json!(20));
        assert!(is_suppressed(&p, &ParamValue::Integer(20)));
        assert!(!is_suppressed(&p, &ParamValue::Integer(0)));
        assert!(!is_suppressed(&p, &ParamValue::Integer(21)));
    }

    #[test]
    fn test_suppression_without_default_uses_zero_value() {
        let p = param(ParamType::Array(ScalarType::String), Style::Form, true);
        assert!(is_suppressed(&p, &ParamValue::Array(vec![])));
        assert!(!is_suppressed(&p, &tags()));
    }

    #[test]
    fn test_mismatched_default_kind_is_unequal() {
        let mut p = param(ParamType::Scalar(ScalarType::String), Style::Form, true);
        p.default = Some(json!(5));
        assert!(!is_suppressed(&p, &ParamValue::String("5".to_string())));
    }

    #[test]
    fn test_integer_equals_float_default() {
        let mut p = param(ParamType::Scalar(ScalarType::Integer), Style::Form, true);
        p.default = Some(json!(10.0));
        assert!(is_suppressed(&p, &ParamValue::Integer(10)));
    }

    #[test]
    fn test_initial_value_prefers_default() {
        let mut p = param(ParamType::Scalar(ScalarType::Integer), Style::Form, true);
        assert_eq!(initial_value(&p), ParamValue::Integer(0));
        p.default = Some(json!(25));
        assert_eq!(initial_value(&p), ParamValue::Integer(25));
        p.default = Some(json!("oops"));
        assert_eq!(initial_value(&p), ParamValue::Integer(0));
    }
}
