use crate::engine::builder::Invocation;
use crate::error::Error;
use crate::model::{Api, Location, Operation, Param, ParamType, ScalarType};
use crate::param::{self, ParamValue};
use crate::utils::{capitalize_first, to_static_str};
use clap::{Arg, ArgAction, ArgMatches, Command};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Id of the trailing positional that collects request body arguments.
pub const BODY_ARG: &str = "body";

/// Clap ids are namespaced by location so a query and a header parameter
/// may share a wire name.
fn arg_id(location: Location, name: &str) -> &'static str {
    to_static_str(format!("{location}:{name}"))
}

/// Generates a dynamic clap command tree from a compiled API.
///
/// One sub-command per operation, in compiled order:
/// ```text
/// <name> get-user <id> [--expand <EXPAND>]
/// <name> create-user [BODY]...
/// ```
/// Hidden operations stay invocable but are left out of help output.
#[must_use]
pub fn generate_command_tree(name: &str, api: &Api) -> Command {
    let mut root = Command::new(to_static_str(name.to_string()))
        .about(if api.title.is_empty() {
            format!("{} API", capitalize_first(name))
        } else {
            api.title.clone()
        })
        .subcommand_required(true)
        .arg_required_else_help(true);

    if !api.description.is_empty() {
        root = root.long_about(api.description.clone());
    }

    for operation in &api.operations {
        root = root.subcommand(operation_command(operation));
    }

    root
}

fn operation_command(operation: &Operation) -> Command {
    let mut command = Command::new(to_static_str(operation.name.clone())).hide(operation.hidden);

    if !operation.short.is_empty() {
        command = command.about(operation.short.clone());
    }
    if !operation.long.is_empty() {
        command = command.long_about(operation.long.trim().to_string());
    }
    for alias in &operation.aliases {
        command = command.visible_alias(to_static_str(alias.clone()));
    }

    for param in &operation.path_params {
        command = command.arg(positional_arg(param));
    }

    let mut longs: HashSet<String> = HashSet::from(["help".to_string()]);
    for param in operation.query_params.iter().chain(&operation.header_params) {
        let mut long = param.option_name().to_string();
        if !longs.insert(long.clone()) {
            long = format!("{}-{}", param.location, param.option_name());
            longs.insert(long.clone());
        }
        command = command.arg(flag_arg(param, long));
    }

    if let Some(media_type) = &operation.body_media_type {
        command = command.arg(
            Arg::new(BODY_ARG)
                .value_name("BODY")
                .help(format!(
                    "Request body ({media_type}): JSON text, @file, or words joined by spaces"
                ))
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .action(ArgAction::Append),
        );
    }

    if !operation.examples.is_empty() {
        let placeholders: String = operation
            .path_params
            .iter()
            .map(|p| format!(" <{}>", p.option_name()))
            .collect();
        let lines: Vec<String> = operation
            .examples
            .iter()
            .map(|example| format!("  {}{placeholders} {example}", operation.name))
            .collect();
        command = command.after_help(format!("Examples:\n{}", lines.join("\n")));
    }

    command
}

fn help_text(param: &Param) -> String {
    let mut help = param
        .description
        .as_deref()
        .map_or_else(
            || format!("{} parameter {}", capitalize_first(param.location.as_str()), param.name),
            |d| d.trim().replace('\n', " "),
        );
    if let Some(default) = &param.default {
        help.push_str(&format!(" [default: {}]", plain(default)));
    }
    if let Some(example) = param.example.as_ref().filter(|e| Some(*e) != param.default.as_ref()) {
        help.push_str(&format!(" [example: {}]", plain(example)));
    }
    help
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn positional_arg(param: &Param) -> Arg {
    Arg::new(arg_id(param.location, &param.name))
        .value_name(to_static_str(param.option_name().to_string()))
        .help(help_text(param))
        .required(true)
        .allow_hyphen_values(true)
        .action(ArgAction::Set)
}

fn flag_arg(param: &Param, long: String) -> Arg {
    let arg = Arg::new(arg_id(param.location, &param.name))
        .long(to_static_str(long))
        .help(help_text(param))
        .required(param.required && param.default.is_none());

    match param.param_type {
        ParamType::Scalar(ScalarType::Boolean) => arg
            .value_name("BOOL")
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .action(ArgAction::Set),
        ParamType::Array(element) => arg
            .value_name(to_static_str(element.as_str().to_uppercase()))
            .value_delimiter(',')
            .action(ArgAction::Append),
        ParamType::Scalar(scalar) => arg
            .value_name(to_static_str(scalar.as_str().to_uppercase()))
            .action(ArgAction::Set),
    }
}

/// Binds clap matches of one operation sub-command.
///
/// Flags the user did not pass take the parameter's default, or the zero
/// value of its type, so suppression can drop them when building.
///
/// # Errors
///
/// Returns `Error::ParameterParse` when a flag value does not match its type.
pub fn bind_arguments(operation: &Operation, matches: &ArgMatches) -> Result<Invocation, Error> {
    let mut args: Vec<String> = operation
        .path_params
        .iter()
        .filter_map(|param| strings(matches, param.location, &param.name))
        .flatten()
        .collect();

    if operation.accepts_body() {
        if let Ok(Some(values)) = matches.try_get_many::<String>(BODY_ARG) {
            args.extend(values.cloned());
        }
    }

    Ok(Invocation {
        args,
        query: bind_flags(&operation.query_params, matches)?,
        headers: bind_flags(&operation.header_params, matches)?,
    })
}

fn bind_flags(
    params: &[Param],
    matches: &ArgMatches,
) -> Result<IndexMap<String, ParamValue>, Error> {
    params
        .iter()
        .map(|param| {
            let value = match strings(matches, param.location, &param.name) {
                Some(raws) => param::parse_many(param, raws.iter().map(String::as_str))?,
                None => param::initial_value(param),
            };
            Ok((param.name.clone(), value))
        })
        .collect()
}

fn strings(matches: &ArgMatches, location: Location, name: &str) -> Option<Vec<String>> {
    matches
        .try_get_many::<String>(&format!("{location}:{name}"))
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
}
