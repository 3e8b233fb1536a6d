//! Shared test utilities

#![allow(dead_code)]

use reqwest::Url;
use serde_json::Value;
use std::path::{Path, PathBuf};
use wayfinder_cli::error::Error;
use wayfinder_cli::model::Api;
use wayfinder_cli::spec::{compile, parse_document, EntrypointResolver};

/// Cached binary path for the wayfinder CLI to avoid repeated lookups
#[allow(deprecated)]
pub static WAYFINDER_BIN: std::sync::LazyLock<PathBuf> =
    std::sync::LazyLock::new(|| assert_cmd::cargo::cargo_bin("wayfinder"));

/// Test helper to create a command with the cached binary
pub fn wayfinder_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(&*WAYFINDER_BIN);
    cmd.env_remove("WAYFINDER_BASE_URL")
        .env_remove("WAYFINDER_LOG")
        .env_remove("WAYFINDER_CONFIG_DIR");
    cmd
}

pub const ENTRYPOINT: &str = "https://api.example.com/";

/// Parses `source` (JSON or YAML) and compiles it against [`ENTRYPOINT`].
pub fn compile_str(source: &str) -> Result<Api, Error> {
    let document: Value = parse_document(source)?;
    let entrypoint = Url::parse(ENTRYPOINT).unwrap();
    compile(&document, &entrypoint, &EntrypointResolver::new(entrypoint.clone()))
}

/// Writes `config.toml` into `dir`.
pub fn write_config(dir: &Path, content: &str) {
    std::fs::write(dir.join("config.toml"), content).unwrap();
}
