//! Freshness of a fetched description document, from HTTP caching headers.

use crate::constants;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use tracing::debug;

/// Largest `delta-seconds` honoured; larger values are clamped to it.
pub const MAX_DELTA_SECONDS: i64 = 2_147_483_648;

/// How long a fetched response may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The response forbids reuse.
    NotCacheable,
    /// The response states an explicit lifetime.
    Until(DateTime<Utc>),
    /// No freshness signal at all.
    Unspecified,
}

/// Reads `Cache-Control`, `Expires` and `Date` (header keys lowercase).
#[must_use]
pub fn freshness(headers: &IndexMap<String, String>, fetched_at: DateTime<Utc>) -> Freshness {
    let mut max_age = None;
    let mut shared_max_age = None;

    if let Some(cache_control) = headers.get(constants::HEADER_CACHE_CONTROL_LC) {
        for directive in cache_control.split(',') {
            let (name, value) = directive
                .split_once('=')
                .map_or((directive, None), |(n, v)| (n, Some(v)));
            let name = name.trim().to_ascii_lowercase();
            let seconds = value.and_then(delta_seconds);

            match name.as_str() {
                "no-store" | "no-cache" | "private" => {
                    debug!("Description response is not cacheable ({name})");
                    return Freshness::NotCacheable;
                }
                "max-age" => max_age = seconds,
                "s-maxage" => shared_max_age = seconds,
                _ => {}
            }
        }
    }

    if let Some(seconds) = shared_max_age.or(max_age) {
        return Freshness::Until(add_or_max(fetched_at, Duration::try_seconds(seconds)));
    }

    if let Some(expires) = headers.get(constants::HEADER_EXPIRES_LC) {
        // An unparseable Expires (commonly "0") means already expired.
        let Some(expires) = parse_http_date(expires) else {
            return Freshness::Until(fetched_at);
        };
        let date = headers
            .get(constants::HEADER_DATE_LC)
            .and_then(|d| parse_http_date(d))
            .unwrap_or(fetched_at);
        return Freshness::Until(add_or_max(
            fetched_at,
            Some((expires - date).max(Duration::zero())),
        ));
    }

    Freshness::Unspecified
}

/// Absolute expiry for a fetched document; `default_window` applies when
/// the response carries no freshness signal.
#[must_use]
pub fn cache_until(
    headers: &IndexMap<String, String>,
    fetched_at: DateTime<Utc>,
    default_window: Duration,
) -> DateTime<Utc> {
    match freshness(headers, fetched_at) {
        Freshness::NotCacheable => fetched_at,
        Freshness::Until(until) => until,
        Freshness::Unspecified => add_or_max(fetched_at, Some(default_window)),
    }
}

#[must_use]
pub fn default_window() -> Duration {
    Duration::days(constants::DEFAULT_CACHE_DAYS)
}

/// Parses a `delta-seconds` value. Values too large to represent are
/// treated as [`MAX_DELTA_SECONDS`] (RFC 9111 section 1.2.2).
fn delta_seconds(value: &str) -> Option<i64> {
    let digits = value.trim().trim_matches('"');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(
        digits
            .parse::<i64>()
            .map_or(MAX_DELTA_SECONDS, |seconds| seconds.min(MAX_DELTA_SECONDS)),
    )
}

/// `start + delta`, saturating at the latest representable instant.
fn add_or_max(start: DateTime<Utc>, delta: Option<Duration>) -> DateTime<Utc> {
    delta
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    httpdate::parse_http_date(value.trim())
        .ok()
        .map(DateTime::<Utc>::from)
}
