use crate::constants;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default = "default_timeout_secs_value")]
    pub default_timeout_secs: u64,
    #[serde(default)]
    pub json_errors: bool,
    /// Reuse window for descriptions fetched without freshness headers
    #[serde(default = "default_cache_days_value")]
    pub default_cache_days: i64,
    /// Configured APIs by name, in file order
    #[serde(default)]
    pub apis: IndexMap<String, ApiConfig>,
}

const fn default_timeout_secs_value() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

const fn default_cache_days_value() -> i64 {
    constants::DEFAULT_CACHE_DAYS
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout_secs_value(),
            json_errors: false,
            default_cache_days: default_cache_days_value(),
            apis: IndexMap::new(),
        }
    }
}

impl GlobalConfig {
    /// Finds an API by name or alias.
    #[must_use]
    pub fn api(&self, name: &str) -> Option<(&str, &ApiConfig)> {
        self.apis
            .get_key_value(name)
            .or_else(|| {
                self.apis
                    .iter()
                    .find(|(_, api)| api.aliases.iter().any(|alias| alias == name))
            })
            .map(|(key, api)| (key.as_str(), api))
    }
}

/// One API the binary knows about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Path or URL of the description document; discovered below the
    /// entrypoint when absent
    #[serde(default)]
    pub spec: Option<String>,
    /// Base URI operations are resolved against
    pub entrypoint: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}
