use super::resolver::Resolver;
use super::schema::{self, Mode};
use super::{ext_bool, ext_str, ext_str_list, resolve, shorthand, str_field, HTTP_METHODS};
use crate::cache_control;
use crate::constants;
use crate::error::Error;
use crate::model::{Api, Location, Operation, Param, ParamType, ScalarType, Style};
use crate::utils::slugify;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use reqwest::Url;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write as _;
use tracing::debug;

/// What the transport knew about the description document when it fetched it.
#[derive(Debug, Clone)]
pub struct FetchMetadata {
    /// Response headers, lowercase keys
    pub headers: IndexMap<String, String>,
    pub fetched_at: DateTime<Utc>,
}

impl FetchMetadata {
    /// A document read now with no caching headers (local files, tests).
    #[must_use]
    pub fn now() -> Self {
        Self {
            headers: IndexMap::new(),
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_headers(headers: IndexMap<String, String>) -> Self {
        Self {
            headers,
            fetched_at: Utc::now(),
        }
    }
}

/// Compiles a description document into an [`Api`].
///
/// Compilation is all-or-nothing: the first malformed construct, unreadable
/// extension or resolver failure aborts it and nothing is returned.
#[derive(Debug, Clone)]
pub struct OperationCompiler {
    default_window: Duration,
}

/// Request body details picked from the declared media types.
struct RequestInfo<'a> {
    media_type: &'a str,
    schema: Option<&'a Value>,
    examples: Vec<&'a Value>,
}

/// Compiles with the default reuse window and a fetch time of now.
///
/// # Errors
///
/// See [`OperationCompiler::compile`].
pub fn compile<R: Resolver + ?Sized>(
    document: &Value,
    entrypoint: &Url,
    resolver: &R,
) -> Result<Api, Error> {
    OperationCompiler::new().compile(document, entrypoint, resolver, &FetchMetadata::now())
}

impl OperationCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_window: cache_control::default_window(),
        }
    }

    /// Reuse window applied when the fetch response has no freshness signal.
    #[must_use]
    pub const fn with_default_window(mut self, window: Duration) -> Self {
        self.default_window = window;
        self
    }

    /// Compiles every non-ignored operation of the document.
    ///
    /// # Errors
    ///
    /// Returns `Error::DescriptionParse` for malformed documents or extension
    /// payloads, and whatever error the resolver reports for a path.
    pub fn compile<R: Resolver + ?Sized>(
        &self,
        document: &Value,
        entrypoint: &Url,
        resolver: &R,
        fetch: &FetchMetadata,
    ) -> Result<Api, Error> {
        let base_path = base_path(document, entrypoint)?;
        if !base_path.is_empty() {
            debug!("Using base path '{base_path}' from matching server");
        }

        let mut operations = Vec::new();
        let mut names = HashSet::new();

        let paths = match document.get("paths") {
            None | Some(Value::Null) => None,
            Some(Value::Object(paths)) => Some(paths),
            Some(_) => {
                return Err(Error::description_parse(
                    "'paths' must be a mapping".to_string(),
                ))
            }
        };

        for (path, item) in paths.into_iter().flatten() {
            let item = resolve(document, item)?;
            let location = format!("path {path}");
            if ext_bool(item, constants::EXT_IGNORE, &location)? {
                debug!("Ignoring {location}");
                continue;
            }

            let resolved = resolver.resolve(&format!("{base_path}{path}"))?;
            let uri_template = template_string(&resolved);
            let path_hidden = ext_bool(item, constants::EXT_HIDDEN, &location)?;

            for method in HTTP_METHODS {
                let Some(op) = item.get(method) else {
                    continue;
                };
                let op_location = format!("{} {path}", method.to_uppercase());
                if ext_bool(op, constants::EXT_IGNORE, &op_location)? {
                    debug!("Ignoring operation {op_location}");
                    continue;
                }

                let operation = compile_operation(
                    document,
                    &OperationSite {
                        method,
                        path,
                        location: &op_location,
                        uri_template: &uri_template,
                        path_item: item,
                        path_hidden,
                    },
                    op,
                )?;

                // Names and aliases share one namespace on the command line.
                for name in std::iter::once(&operation.name).chain(&operation.aliases) {
                    if !names.insert(name.clone()) {
                        return Err(Error::description_parse(format!(
                            "Duplicate command name or alias '{name}' ({op_location})"
                        )));
                    }
                }
                operations.push(operation);
            }
        }

        let info = document.get("info").unwrap_or(&Value::Null);

        Ok(Api {
            title: str_field(info, "title").unwrap_or_default().to_string(),
            description: str_field(info, "description")
                .unwrap_or_default()
                .to_string(),
            operations,
            cache_until: cache_control::cache_until(
                &fetch.headers,
                fetch.fetched_at,
                self.default_window,
            ),
        })
    }
}

impl Default for OperationCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an operation sits in the document.
struct OperationSite<'a> {
    method: &'a str,
    path: &'a str,
    location: &'a str,
    uri_template: &'a str,
    path_item: &'a Value,
    path_hidden: bool,
}

/// Path prefix of the first server whose scheme and host match the entrypoint.
fn base_path(document: &Value, entrypoint: &Url) -> Result<String, Error> {
    let mut origin = format!(
        "{}://{}",
        entrypoint.scheme(),
        entrypoint.host_str().unwrap_or_default()
    );
    if let Some(port) = entrypoint.port() {
        let _ = write!(origin, ":{port}");
    }

    let servers = document
        .get("servers")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for url in servers.iter().filter_map(|server| str_field(server, "url")) {
        let Some(rest) = url.strip_prefix(&origin) else {
            continue;
        };
        if !(rest.is_empty() || rest.starts_with('/')) {
            continue;
        }
        let parsed = Url::parse(url).map_err(|e| {
            Error::description_parse(format!("Invalid server URL '{url}': {e}"))
        })?;
        return Ok(parsed.path().trim_end_matches('/').to_string());
    }

    Ok(String::new())
}

/// Absolute URI text with `{name}` placeholders restored after percent-encoding.
fn template_string(url: &Url) -> String {
    url.as_str().replace("%7B", "{").replace("%7D", "}")
}

fn compile_operation(
    document: &Value,
    site: &OperationSite<'_>,
    op: &Value,
) -> Result<Operation, Error> {
    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    let mut header_params = Vec::new();

    for (location, param) in merge_params(document, site, op)? {
        let Some(param) = compile_param(document, param, location, site.location)? else {
            continue;
        };
        match location {
            Location::Path => path_params.push(param),
            Location::Query => query_params.push(param),
            Location::Header => header_params.push(param),
        }
    }

    let name = match ext_str(op, constants::EXT_NAME, site.location)? {
        Some(name) => name,
        None => str_field(op, "operationId").map_or_else(
            || slugify(&format!("{}-{}", site.method, site.path)),
            slugify,
        ),
    };
    let aliases = ext_str_list(op, constants::EXT_ALIASES, site.location)?;
    let hidden = site.path_hidden || ext_bool(op, constants::EXT_HIDDEN, site.location)?;

    let mut long = ext_str(op, constants::EXT_DESCRIPTION, site.location)?
        .or_else(|| str_field(op, "description").map(str::to_string))
        .unwrap_or_default();
    let mut examples = Vec::new();

    let mut body_media_type = None;
    if let Some(body) = op.get("requestBody") {
        let body = resolve(document, body)?;
        if let Some(info) = request_info(document, body)? {
            debug!(
                "{} accepts a request body as {}",
                site.location, info.media_type
            );
            write_request_docs(document, &info, &mut long, &mut examples)?;
            body_media_type = Some(info.media_type.to_string());
        }
    }

    write_response_docs(document, op, &mut long)?;

    Ok(Operation {
        name,
        aliases,
        short: str_field(op, "summary").unwrap_or_default().to_string(),
        long,
        method: site.method.to_uppercase(),
        uri_template: site.uri_template.to_string(),
        path_params,
        query_params,
        header_params,
        body_media_type,
        examples,
        hidden,
    })
}

/// Path-level parameters followed by operation-level ones; an operation-level
/// entry with the same name and location replaces the path-level one in place.
fn merge_params<'a>(
    document: &'a Value,
    site: &OperationSite<'a>,
    op: &'a Value,
) -> Result<Vec<(Location, &'a Value)>, Error> {
    let mut merged: IndexMap<(String, String), &Value> = IndexMap::new();

    let lists = [site.path_item.get("parameters"), op.get("parameters")];
    for list in lists.into_iter().flatten().filter_map(Value::as_array) {
        for entry in list {
            let param = resolve(document, entry)?;
            let name = str_field(param, "name").ok_or_else(|| {
                Error::description_parse(format!(
                    "Parameter without a name on {}",
                    site.location
                ))
            })?;
            let location = str_field(param, "in").ok_or_else(|| {
                Error::description_parse(format!(
                    "Parameter '{name}' on {} has no 'in' location",
                    site.location
                ))
            })?;
            merged.insert((name.to_string(), location.to_string()), param);
        }
    }

    Ok(merged
        .into_iter()
        .filter_map(|((name, location), param)| {
            let parsed = Location::from_openapi(&location);
            if parsed.is_none() {
                debug!(
                    "Skipping {location} parameter '{name}' on {}",
                    site.location
                );
            }
            parsed.map(|location| (location, param))
        })
        .collect())
}

fn compile_param(
    document: &Value,
    param: &Value,
    location: Location,
    op_location: &str,
) -> Result<Option<Param>, Error> {
    let name = str_field(param, "name").unwrap_or_default().to_string();
    let param_location = format!("parameter '{name}' of {op_location}");
    if ext_bool(param, constants::EXT_IGNORE, &param_location)? {
        debug!("Ignoring {param_location}");
        return Ok(None);
    }

    let schema = param
        .get("schema")
        .map(|schema| resolve(document, schema))
        .transpose()?;

    let param_type = match schema.and_then(schema::schema_type) {
        Some("array") => {
            let items = schema
                .and_then(|s| s.get("items"))
                .map(|items| resolve(document, items))
                .transpose()?;
            ParamType::Array(ScalarType::from_schema_type(
                items.and_then(schema::schema_type).unwrap_or("string"),
            ))
        }
        Some(other) => ParamType::Scalar(ScalarType::from_schema_type(other)),
        None => ParamType::default(),
    };

    let style = if str_field(param, "style") == Some("form") {
        Style::Form
    } else {
        Style::Simple
    };
    let explode = param
        .get("explode")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let schema_field = |key: &str| schema.and_then(|s| s.get(key)).cloned();
    let default = schema_field("default");
    let example = param
        .get("example")
        .cloned()
        .or_else(|| first_example(document, param))
        .or_else(|| schema_field("example"))
        .or_else(|| default.clone());

    let description = ext_str(param, constants::EXT_DESCRIPTION, &param_location)?
        .or_else(|| str_field(param, "description").map(str::to_string));

    Ok(Some(Param {
        display_name: ext_str(param, constants::EXT_NAME, &param_location)?,
        description,
        location,
        param_type,
        style,
        explode,
        required: location == Location::Path
            || param.get("required").and_then(Value::as_bool).unwrap_or(false),
        default,
        example,
        name,
    }))
}

/// First named example carrying a `value`.
fn first_example(document: &Value, holder: &Value) -> Option<Value> {
    holder
        .get("examples")
        .and_then(Value::as_object)?
        .values()
        .filter_map(|example| resolve(document, example).ok())
        .find_map(|example| example.get("value").cloned())
}

/// Picks the body media type: JSON-flavored first, then YAML-flavored, then
/// the first declared.
fn request_info<'a>(document: &'a Value, body: &'a Value) -> Result<Option<RequestInfo<'a>>, Error> {
    let Some(Value::Object(content)) = body.get("content") else {
        return Ok(None);
    };

    let picked = content
        .keys()
        .find(|mt| mt.contains(constants::CONTENT_TYPE_IDENTIFIER_JSON))
        .or_else(|| {
            content
                .keys()
                .find(|mt| mt.contains(constants::CONTENT_TYPE_IDENTIFIER_YAML))
        })
        .or_else(|| content.keys().next());

    let Some(media_type) = picked else {
        return Ok(None);
    };
    let media = resolve(document, &content[media_type.as_str()])?;

    let examples = match media.get("example") {
        Some(example) => vec![example],
        None => media
            .get("examples")
            .and_then(Value::as_object)
            .map(|examples| {
                examples
                    .values()
                    .filter_map(|example| resolve(document, example).ok())
                    .filter_map(|example| example.get("value"))
                    .take(1)
                    .collect()
            })
            .unwrap_or_default(),
    };

    Ok(Some(RequestInfo {
        media_type,
        schema: media.get("schema"),
        examples,
    }))
}

fn write_request_docs(
    document: &Value,
    info: &RequestInfo<'_>,
    long: &mut String,
    examples: &mut Vec<String>,
) -> Result<(), Error> {
    for (i, example) in info.examples.iter().enumerate() {
        let text = match example {
            Value::String(s) => s.clone(),
            Value::Object(object) => {
                let rendered = shorthand::render(object);
                examples.push(rendered.clone());
                rendered
            }
            other => other.to_string(),
        };
        if i == 0 {
            long.push_str("\n## Input Example\n\n");
        }
        let _ = write!(long, "\n{text}\n");
    }

    if let Some(body_schema) = info.schema {
        let rendered = schema::render(document, body_schema, Mode::Write)?;
        let _ = write!(
            long,
            "\n## Request Schema ({})\n\n```schema\n{rendered}\n```\n",
            info.media_type
        );
    }

    Ok(())
}

/// One section per declared status code, in lexical order of the code.
fn write_response_docs(document: &Value, op: &Value, long: &mut String) -> Result<(), Error> {
    let Some(Value::Object(responses)) = op.get("responses") else {
        return Ok(());
    };

    let mut codes: Vec<&String> = responses.keys().collect();
    codes.sort();

    for code in codes {
        let response = resolve(document, &responses[code.as_str()])?;
        match response.get("content") {
            Some(Value::Object(content)) if !content.is_empty() => {
                for (content_type, media) in content {
                    let _ = write!(long, "\n## Response {code} ({content_type})\n");
                    if let Some(response_schema) = media.get("schema") {
                        let rendered = schema::render(document, response_schema, Mode::Read)?;
                        let _ = write!(long, "\n```schema\n{rendered}\n```\n");
                    }
                }
            }
            _ => {
                let _ = write!(long, "\n## Response {code}\n");
                if let Some(description) =
                    str_field(response, "description").filter(|d| !d.is_empty())
                {
                    let _ = write!(long, "\n{description}\n");
                }
            }
        }
    }

    Ok(())
}
