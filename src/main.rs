use clap::error::ErrorKind;
use clap::Parser;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use wayfinder_cli::cli::errors::print_error_with_json;
use wayfinder_cli::cli::tracing_init::init_tracing;
use wayfinder_cli::cli::{Cli, Commands};
use wayfinder_cli::config::{self, models::GlobalConfig};
use wayfinder_cli::engine::{self, loader, ArgsBody, HttpTransport};
use wayfinder_cli::error::Error;
use wayfinder_cli::links::default_resolver;
use wayfinder_cli::response::Response;
use wayfinder_cli::spec::{EntrypointResolver, OperationCompiler};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let loaded = cli
        .config_dir
        .clone()
        .map_or_else(config::get_config_dir, Ok)
        .and_then(|dir| config::load_global_config(&dir).map(|config| (dir, config)));

    let (config_dir, global_config) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            print_error_with_json(&e, cli.json_errors);
            std::process::exit(1);
        }
    };

    let json_errors = cli.json_errors || global_config.json_errors;
    if let Err(e) = run_command(&cli, &config_dir, &global_config).await {
        print_error_with_json(&e, json_errors);
        std::process::exit(1);
    }
}

async fn run_command(cli: &Cli, config_dir: &Path, config: &GlobalConfig) -> Result<(), Error> {
    match &cli.command {
        Commands::List => {
            if config.apis.is_empty() {
                println!("No APIs configured.");
                return Ok(());
            }
            println!("Configured APIs:");
            for (name, api) in &config.apis {
                if api.aliases.is_empty() {
                    println!("- {name} ({})", api.entrypoint);
                } else {
                    println!("- {name} ({}) aliases: {}", api.entrypoint, api.aliases.join(", "));
                }
            }
            Ok(())
        }
        Commands::Api(args) => {
            let Some((api_name, rest)) = args.split_first() else {
                return Err(Error::invalid_config("Missing API name"));
            };
            execute_api_command(api_name, rest, cli, config_dir, config).await
        }
    }
}

async fn execute_api_command(
    api_name: &str,
    args: &[String],
    cli: &Cli,
    config_dir: &Path,
    config: &GlobalConfig,
) -> Result<(), Error> {
    let (name, api_config) = config.api(api_name).ok_or_else(|| {
        Error::invalid_config(format!(
            "API '{api_name}' is not configured.\n\n\
             Hint: Use 'wayfinder list' to see configured APIs."
        ))
    })?;

    let entrypoint_text = config::effective_entrypoint(&api_config.entrypoint);
    let entrypoint =
        Url::parse(&entrypoint_text).map_err(|e| Error::resolution(&entrypoint_text, e))?;
    let transport = HttpTransport::new(Duration::from_secs(config.default_timeout_secs))?;

    let loaded = match &api_config.spec {
        Some(source) => loader::load_description(&spec_source(source, config_dir), &transport).await?,
        None => loader::discover(&entrypoint, &transport).await?,
    };

    let mut resolver = EntrypointResolver::new(entrypoint.clone());
    if let Some(location) = loaded.location.clone() {
        resolver = resolver.with_location(location);
    }
    let default_window = chrono::Duration::try_days(config.default_cache_days).ok_or_else(|| {
        Error::invalid_config(format!(
            "default_cache_days out of range: {}",
            config.default_cache_days
        ))
    })?;
    let api = OperationCompiler::new()
        .with_default_window(default_window)
        .compile(&loaded.document, &entrypoint, &resolver, &loaded.fetch)?;
    debug!(
        "Compiled {} operation(s) for '{name}', description fresh until {}",
        api.operations.len(),
        api.cache_until
    );

    let command = engine::generate_command_tree(name, &api);
    let matches = match command.try_get_matches_from(std::iter::once(name.to_string()).chain(args.iter().cloned())) {
        Ok(matches) => matches,
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            e.print()?;
            return Ok(());
        }
        Err(e) => {
            return Err(Error::invalid_config(format!(
                "Invalid command for API '{name}': {e}\n\
                 Hint: Use 'wayfinder {name} --help' to see available commands."
            )))
        }
    };

    let Some((operation_name, operation_matches)) = matches.subcommand() else {
        return Err(Error::UnknownOperation {
            name: String::new(),
        });
    };
    let operation = api
        .operation(operation_name)
        .ok_or_else(|| Error::UnknownOperation {
            name: operation_name.to_string(),
        })?;

    let invocation = engine::bind_arguments(operation, operation_matches)?;
    let request = engine::build(operation, &invocation, &ArgsBody)?;

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&request.to_redacted_json())?);
        return Ok(());
    }

    let response = engine::execute(&transport, &request, default_resolver())
        .await
        .map_err(|e| match &e {
            Error::Network(req_err) if req_err.is_connect() => {
                e.with_context("Failed to connect to API server")
            }
            Error::Network(req_err) if req_err.is_timeout() => e.with_context("Request timed out"),
            _ => e,
        })?;
    print_response(&response)
}

/// Relative description paths are taken from the config directory when a
/// file exists there.
fn spec_source(source: &str, config_dir: &Path) -> String {
    if source.starts_with("http://") || source.starts_with("https://") {
        return source.to_string();
    }
    let candidate: PathBuf = config_dir.join(source);
    if Path::new(source).is_relative() && candidate.exists() {
        candidate.to_string_lossy().into_owned()
    } else {
        source.to_string()
    }
}

/// Status and links go to stderr so stdout carries only the body.
fn print_response(response: &Response) -> Result<(), Error> {
    eprintln!("HTTP {}", response.status);
    if !response.body.is_null() {
        println!("{}", serde_json::to_string_pretty(&response.body)?);
    }
    if !response.links.is_empty() {
        eprintln!("Links:");
        for link in response.links.all() {
            eprintln!("  {}: {}", link.rel, link.uri);
        }
    }
    Ok(())
}
