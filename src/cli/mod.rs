pub mod errors;
pub mod tracing_init;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Wayfinder: a command-line client for any API with an OpenAPI 3 description",
    long_about = "Wayfinder compiles an API's OpenAPI 3 description into commands at runtime\n\
                  and shows the hypermedia links found in every response.\n\n\
                  Examples:\n  \
                  wayfinder list\n  \
                  wayfinder petstore --help\n  \
                  wayfinder petstore get-pet 42\n  \
                  wayfinder --dry-run petstore create-pet '{\"name\": \"Rex\"}'"
)]
pub struct Cli {
    /// Directory holding config.toml (overrides WAYFINDER_CONFIG_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Output all errors as structured JSON to stderr
    #[arg(long, global = true, help = "Output errors in JSON format")]
    pub json_errors: bool,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        global = true,
        action = ArgAction::Count,
        help = "Increase logging verbosity (-v for debug, -vv for trace)"
    )]
    pub verbosity: u8,

    /// Show the HTTP request that would be made without executing it
    #[arg(long, global = true, help = "Show request details without executing")]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured APIs
    List,
    /// Run an operation of a configured API: <api> <operation> [args...]
    #[command(external_subcommand)]
    Api(Vec<String>),
}
