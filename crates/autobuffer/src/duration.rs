use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AutobufferError, AutobufferResult};

static DURATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]*\.?[0-9]*(?:ns|us|µs|μs|ms|s|m|h))+$").unwrap());
static COMPONENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]*\.?[0-9]*)(ns|us|µs|μs|ms|s|m|h)").unwrap());

/// Parses a duration written as `1h50m`, `90s`, `1.5h` or `2h45m30.5s`.
///
/// A bare `0` is accepted as zero. Negative durations are rejected.
pub fn parse_duration(input: &str) -> AutobufferResult<Duration> {
    let invalid = || AutobufferError::InvalidDuration(input.to_string());

    let value = input.trim();
    let value = value.strip_prefix('+').unwrap_or(value);
    if value == "0" {
        return Ok(Duration::ZERO);
    }
    if value.is_empty() || !DURATION_REGEX.is_match(value) {
        return Err(invalid());
    }

    let mut nanos = 0f64;
    for captures in COMPONENT_REGEX.captures_iter(value) {
        let number: f64 = captures[1].parse().map_err(|_| invalid())?;
        let unit = match &captures[2] {
            "ns" => 1.,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        nanos += number * unit;
    }

    // durations beyond ~584 years do not fit
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}
