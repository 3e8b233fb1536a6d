use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Config(String),

    /// The API description document is malformed or carries an unreadable extension.
    #[error("Invalid API description: {0}")]
    DescriptionParse(String),
    /// The resolver collaborator could not turn a path into an absolute URI.
    #[error("Cannot resolve '{uri}': {reason}")]
    Resolution { uri: String, reason: String },
    /// A command-line argument does not match the declared parameter type.
    #[error("Could not parse param {name} with input {input}: {reason}")]
    ParameterParse {
        name: String,
        input: String,
        reason: String,
    },
    #[error("Missing argument '{name}' for command '{operation}'")]
    MissingArgument { operation: String, name: String },
    #[error("Too many arguments for command '{operation}': expected {expected}, got {actual}")]
    UnexpectedArguments {
        operation: String,
        expected: usize,
        actual: usize,
    },
    #[error("Unknown command '{name}'")]
    UnknownOperation { name: String },
    /// A link parser rejected the syntax of its dialect.
    #[error("Cannot parse {dialect} links: {reason}")]
    LinkDialect { dialect: String, reason: String },
    #[error("Invalid link URI '{uri}': {reason}")]
    InvalidLinkUri { uri: String, reason: String },
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// JSON representation of an error for structured output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error_type: String,
    pub message: String,
    pub context: Option<String>,
}

impl Error {
    #[must_use]
    pub fn description_parse(message: impl Into<String>) -> Self {
        Self::DescriptionParse(message.into())
    }

    #[must_use]
    pub fn resolution(uri: &str, reason: impl ToString) -> Self {
        Self::Resolution {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn parameter_parse(name: &str, input: &str, reason: impl ToString) -> Self {
        Self::ParameterParse {
            name: name.to_string(),
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn link_dialect(dialect: &str, reason: impl ToString) -> Self {
        Self::LinkDialect {
            dialect: dialect.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error for better user messaging
    #[must_use]
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::Network(e) => Self::Config(format!("{context}: {e}")),
            Self::Io(e) => Self::Config(format!("{context}: {e}")),
            _ => self,
        }
    }

    /// Convert error to JSON representation for structured output
    #[must_use]
    pub fn to_json(&self) -> JsonError {
        let (error_type, context) = match self {
            Self::Config(_) => ("Configuration", None),
            Self::Io(io_err) => (
                "FileSystem",
                match io_err.kind() {
                    std::io::ErrorKind::NotFound => {
                        Some("Check that the file path is correct and the file exists.")
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check file permissions or run with appropriate privileges.")
                    }
                    _ => None,
                },
            ),
            Self::Network(req_err) => (
                "Network",
                if req_err.is_connect() {
                    Some("Check that the API server is running and accessible.")
                } else if req_err.is_timeout() {
                    Some("The API server may be slow or unresponsive. Try again later.")
                } else {
                    None
                },
            ),
            Self::Yaml(_) => ("YAMLParsing", Some("Check that the document is valid YAML.")),
            Self::Json(_) => ("JSONParsing", Some("Check that the document is valid JSON.")),
            Self::Toml(_) => (
                "TOMLParsing",
                Some("Check that your configuration file is valid TOML syntax."),
            ),
            Self::DescriptionParse(_) => (
                "DescriptionParse",
                Some("Check that the API description is a valid OpenAPI 3.x document."),
            ),
            Self::Resolution { .. } => (
                "Resolution",
                Some("Check the configured entrypoint and the document's server URLs."),
            ),
            Self::ParameterParse { .. } => (
                "ParameterParse",
                Some("Check the value passed for this parameter against its declared type."),
            ),
            Self::MissingArgument { .. } | Self::UnexpectedArguments { .. } => (
                "Arguments",
                Some("Use --help on the command to see its arguments."),
            ),
            Self::UnknownOperation { .. } => (
                "UnknownOperation",
                Some("Use --help on the API to list its commands."),
            ),
            Self::LinkDialect { .. } | Self::InvalidLinkUri { .. } => ("LinkDialect", None),
            Self::InvalidHeader { .. } => ("InvalidHeader", None),
        };

        JsonError {
            error_type: error_type.to_string(),
            message: self.to_string(),
            context: context.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_parse_message_names_param_and_input() {
        let err = Error::parameter_parse("id", "abc", "invalid digit found in string");
        let message = err.to_string();
        assert!(message.contains("id"));
        assert!(message.contains("abc"));
    }

    #[test]
    fn test_to_json_description_parse() {
        let json = Error::description_parse("missing openapi version").to_json();
        assert_eq!(json.error_type, "DescriptionParse");
        assert!(json.message.contains("missing openapi version"));
        assert!(json.context.is_some());
    }

    #[test]
    fn test_with_context_leaves_domain_errors_alone() {
        let err = Error::link_dialect("link-header", "unterminated '<'").with_context("ctx");
        assert!(matches!(err, Error::LinkDialect { .. }));
    }
}
