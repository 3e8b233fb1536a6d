//! Read-only configuration: `config.toml` in the wayfinder config directory.
//!
//! ```toml
//! default_timeout_secs = 30
//!
//! [apis.petstore]
//! spec = "https://petstore.example.com/openapi.json"
//! entrypoint = "https://petstore.example.com"
//! aliases = ["pets"]
//! ```

pub mod models;

use crate::constants;
use crate::error::Error;
use models::GlobalConfig;
use std::path::{Path, PathBuf};

/// Gets the default configuration directory path.
///
/// `WAYFINDER_CONFIG_DIR` wins over the platform config directory.
///
/// # Errors
///
/// Returns an error if neither is available.
pub fn get_config_dir() -> Result<PathBuf, Error> {
    if let Ok(dir) = std::env::var(constants::ENV_WAYFINDER_CONFIG_DIR) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join(constants::CONFIG_DIR_NAME))
        .ok_or_else(|| Error::invalid_config("Could not determine the configuration directory"))
}

/// Loads `config.toml` from `config_dir`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_global_config(config_dir: &Path) -> Result<GlobalConfig, Error> {
    let config_path = config_dir.join(constants::CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content = std::fs::read_to_string(&config_path)?;
    let config: GlobalConfig = toml::from_str(&content)?;

    if !(0..=constants::MAX_CACHE_DAYS).contains(&config.default_cache_days) {
        return Err(Error::invalid_config(format!(
            "default_cache_days must be between 0 and {}, got {}",
            constants::MAX_CACHE_DAYS,
            config.default_cache_days
        )));
    }
    Ok(config)
}

/// The entrypoint to use for an API: `WAYFINDER_BASE_URL`, else the configured one.
#[must_use]
pub fn effective_entrypoint(configured: &str) -> String {
    std::env::var(constants::ENV_WAYFINDER_BASE_URL)
        .ok()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| configured.to_string())
}
