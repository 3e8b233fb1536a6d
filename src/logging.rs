//! Request and response logging with redaction of credential headers.
//!
//! - `info`: method, URI, status and duration
//! - `debug`: headers, sensitive values replaced by `[REDACTED]`
//! - `trace`: bodies, responses truncated at `WAYFINDER_LOG_MAX_BODY` characters

use crate::constants;
use crate::engine::builder::Request;
use indexmap::IndexMap;
use tracing::{debug, info, trace};

const DEFAULT_MAX_BODY_LEN: usize = 1000;

/// Checks if a header name should be redacted
#[must_use]
pub fn should_redact_header(header_name: &str) -> bool {
    let lower = header_name.to_lowercase();
    matches!(
        lower.as_str(),
        "authorization"
            | "proxy-authorization"
            | "cookie"
            | "set-cookie"
            | "x-api-key"
            | "x-access-token"
            | "x-auth-token"
            | "api-key"
            | "api_key"
            | "token"
            | "secret"
            | "password"
    )
}

fn display_value<'a>(name: &str, value: &'a str) -> &'a str {
    if should_redact_header(name) && !value.is_empty() {
        "[REDACTED]"
    } else {
        value
    }
}

pub fn log_request(request: &Request) {
    info!(
        target: "wayfinder::executor",
        "→ {} {}",
        request.method.to_uppercase(),
        request.uri
    );

    if !request.headers.is_empty() {
        debug!(target: "wayfinder::executor", "Request headers:");
    }
    for (name, value) in &request.headers {
        debug!(
            target: "wayfinder::executor",
            "  {}: {}",
            name,
            display_value(name, value)
        );
    }

    if let Some(body) = &request.body {
        trace!(target: "wayfinder::executor", "Request body: {}", body);
    }
}

pub fn log_response(
    status: u16,
    duration_ms: u128,
    headers: &IndexMap<String, String>,
    body: &str,
    max_body_len: usize,
) {
    info!(
        target: "wayfinder::executor",
        "← {} ({}ms)",
        status,
        duration_ms
    );

    if !headers.is_empty() {
        debug!(target: "wayfinder::executor", "Response headers:");
    }
    for (name, value) in headers {
        debug!(
            target: "wayfinder::executor",
            "  {}: {}",
            name,
            display_value(name, value)
        );
    }

    if body.is_empty() {
        return;
    }
    match body.char_indices().nth(max_body_len) {
        Some((cut, _)) => trace!(
            target: "wayfinder::executor",
            "Response body: {} (truncated at {} chars)",
            &body[..cut],
            max_body_len
        ),
        None => trace!(target: "wayfinder::executor", "Response body: {}", body),
    }
}

/// Gets the maximum logged body length from `WAYFINDER_LOG_MAX_BODY`
#[must_use]
pub fn get_max_body_len() -> usize {
    std::env::var(constants::ENV_WAYFINDER_LOG_MAX_BODY)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_BODY_LEN)
}
