//! Centralized string constants for wayfinder
//!
//! Extension field names, content types, header names and environment
//! variables shared by the compiler, the request builder and the binary.

// HTTP Headers
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ACCEPT: &str = "Accept";

// Lowercase header names as stored on decoded responses
pub const HEADER_LINK_LC: &str = "link";
pub const HEADER_CONTENT_TYPE_LC: &str = "content-type";
pub const HEADER_CACHE_CONTROL_LC: &str = "cache-control";
pub const HEADER_EXPIRES_LC: &str = "expires";
pub const HEADER_DATE_LC: &str = "date";

// Content Types
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_OPENAPI_PREFIX: &str = "application/vnd.oai.openapi";
pub const CONTENT_TYPE_YAML: &str = "application/yaml";

// Content type identifiers used for media type preference and body decoding
pub const CONTENT_TYPE_IDENTIFIER_JSON: &str = "json";
pub const CONTENT_TYPE_IDENTIFIER_YAML: &str = "yaml";

// OpenAPI Extensions
pub const EXT_NAME: &str = "x-cli-name";
pub const EXT_ALIASES: &str = "x-cli-aliases";
pub const EXT_DESCRIPTION: &str = "x-cli-description";
pub const EXT_IGNORE: &str = "x-cli-ignore";
pub const EXT_HIDDEN: &str = "x-cli-hidden";

// Well-known locations of a description document relative to an entrypoint
pub const LOCATION_HINTS: &[&str] = &["/openapi.json", "/openapi.yaml"];

// Environment Variables
pub const ENV_WAYFINDER_CONFIG_DIR: &str = "WAYFINDER_CONFIG_DIR";
pub const ENV_WAYFINDER_BASE_URL: &str = "WAYFINDER_BASE_URL";
pub const ENV_WAYFINDER_LOG: &str = "WAYFINDER_LOG";
pub const ENV_WAYFINDER_LOG_FORMAT: &str = "WAYFINDER_LOG_FORMAT";
pub const ENV_WAYFINDER_LOG_FILE: &str = "WAYFINDER_LOG_FILE";
pub const ENV_WAYFINDER_LOG_MAX_BODY: &str = "WAYFINDER_LOG_MAX_BODY";

// Configuration
pub const CONFIG_DIR_NAME: &str = "wayfinder";
pub const CONFIG_FILENAME: &str = "config.toml";

/// Reuse window for a description document fetched without any freshness signal.
pub const DEFAULT_CACHE_DAYS: i64 = 7;
pub const MAX_CACHE_DAYS: i64 = 36_500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Link relations
pub const REL_SELF: &str = "self";
pub const REL_CURIES: &str = "curies";
