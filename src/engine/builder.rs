//! Turns one compiled operation plus bound argument values into a request.
//!
//! Building performs no I/O of its own; the body is produced by a
//! [`BodySource`] and the request is sent by a transport.

use crate::constants;
use crate::error::Error;
use crate::logging::should_redact_header;
use crate::model::{Operation, Param};
use crate::param::{self, ParamValue};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub method: String,
    pub uri: String,
    /// In insertion order; a name may repeat
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Request {
    /// First value of a header, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// JSON view for dry runs, with sensitive header values masked.
    #[must_use]
    pub fn to_redacted_json(&self) -> Value {
        let headers: Vec<Value> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let value = if should_redact_header(name) {
                    "[REDACTED]"
                } else {
                    value.as_str()
                };
                serde_json::json!({ "name": name, "value": value })
            })
            .collect();

        serde_json::json!({
            "dry_run": true,
            "method": self.method,
            "uri": self.uri,
            "headers": headers,
            "body": self.body,
        })
    }
}

/// Argument values bound for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    /// Positional arguments: one per path parameter, then body arguments
    pub args: Vec<String>,
    /// Query values keyed by wire name
    pub query: IndexMap<String, ParamValue>,
    /// Header values keyed by wire name
    pub headers: IndexMap<String, ParamValue>,
}

impl Invocation {
    #[must_use]
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.query.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.headers.insert(name.into(), value);
        self
    }
}

/// Produces raw body text from the positional arguments left after the
/// path parameters.
pub trait BodySource {
    /// # Errors
    ///
    /// Returns an error if the body cannot be produced (e.g. an unreadable file).
    fn body(&self, operation: &Operation, args: &[String]) -> Result<Option<String>, Error>;
}

/// Body from command-line arguments.
///
/// - no arguments: no body
/// - a single argument that is valid JSON: sent verbatim
/// - a single `@path` argument: the file's contents
/// - anything else: the arguments joined by single spaces
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgsBody;

impl BodySource for ArgsBody {
    fn body(&self, _operation: &Operation, args: &[String]) -> Result<Option<String>, Error> {
        match args {
            [] => Ok(None),
            [single] => {
                if let Some(path) = single.strip_prefix('@') {
                    let content = std::fs::read_to_string(path)
                        .map_err(|e| Error::from(e).with_context(&format!("reading body from {path}")))?;
                    return Ok(Some(content));
                }
                Ok(Some(single.clone()))
            }
            many => Ok(Some(many.join(" "))),
        }
    }
}

/// Fixed body text, ignoring arguments.
impl BodySource for Option<String> {
    fn body(&self, _operation: &Operation, _args: &[String]) -> Result<Option<String>, Error> {
        Ok(self.clone())
    }
}

/// Builds the request for `operation`.
///
/// # Errors
///
/// - `Error::MissingArgument` when fewer positionals than path parameters are given
/// - `Error::UnexpectedArguments` for extra positionals on an operation without a body
/// - `Error::ParameterParse` when a path argument does not match its type
/// - `Error::InvalidHeader` for header values containing control characters
pub fn build(
    operation: &Operation,
    invocation: &Invocation,
    body_source: &dyn BodySource,
) -> Result<Request, Error> {
    let path_count = operation.path_params.len();
    if let Some(missing) = operation.path_params.get(invocation.args.len()) {
        return Err(Error::MissingArgument {
            operation: operation.name.clone(),
            name: missing.option_name().to_string(),
        });
    }
    let (path_args, rest) = invocation.args.split_at(path_count);
    if !operation.accepts_body() && !rest.is_empty() {
        return Err(Error::UnexpectedArguments {
            operation: operation.name.clone(),
            expected: path_count,
            actual: invocation.args.len(),
        });
    }

    // Parse everything before substituting anything.
    let path_values = operation
        .path_params
        .iter()
        .zip(path_args)
        .map(|(param, raw)| param::parse(param, raw).map(|value| (param, value)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut uri = operation.uri_template.clone();
    for (param, value) in &path_values {
        let wire = param::serialize(param, value)
            .into_iter()
            .next()
            .unwrap_or_default();
        uri = uri.replace(
            &format!("{{{}}}", param.name),
            &urlencoding::encode(&wire),
        );
    }

    let query = bound_pairs(&operation.query_params, &invocation.query);
    if !query.is_empty() {
        let encoded: Vec<String> = query
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect();
        uri.push(if uri.contains('?') { '&' } else { '?' });
        uri.push_str(&encoded.join("&"));
    }

    let mut headers = bound_pairs(&operation.header_params, &invocation.headers);
    for (name, value) in &headers {
        validate_header_value(name, value)?;
    }

    let body = match &operation.body_media_type {
        Some(media_type) => {
            let body = body_source.body(operation, rest)?;
            if body.is_some() {
                headers.push((constants::HEADER_CONTENT_TYPE.to_string(), media_type.clone()));
            }
            body
        }
        None => None,
    };

    Ok(Request {
        method: operation.method.clone(),
        uri,
        headers,
        body,
    })
}

/// Serialized `(name, value)` pairs for every bound, non-suppressed
/// parameter, grouped by name in declaration order.
fn bound_pairs(params: &[Param], values: &IndexMap<String, ParamValue>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for param in params {
        let Some(value) = values.get(&param.name) else {
            continue;
        };
        if param::is_suppressed(param, value) {
            trace!("Omitting {} parameter '{}' at its default", param.location, param.name);
            continue;
        }
        pairs.extend(
            param::serialize(param, value)
                .into_iter()
                .map(|wire| (param.name.clone(), wire)),
        );
    }
    pairs
}

/// Validates that a header value doesn't contain control characters
fn validate_header_value(name: &str, value: &str) -> Result<(), Error> {
    if value.chars().any(|c| c == '\r' || c == '\n' || c == '\0') {
        return Err(Error::InvalidHeader {
            name: name.to_string(),
            reason: "value contains a newline, carriage return or null character".to_string(),
        });
    }
    Ok(())
}
