//! # Duration Parsing
//!
//! Handles parsing Kubernetes-style duration strings such as `30s`, `1m` or `2h`.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

static DURATION_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?P<number>\d+)(?P<unit>[smhd])$").ok());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration string cannot be empty")]
    Empty,
    #[error("invalid duration format '{0}', expected <number><unit> (e.g. '10s', '1m', '1h')")]
    InvalidFormat(String),
    #[error("duration must be greater than 0, got '{0}'")]
    Zero(String),
}

/// Parse a Kubernetes duration string into a [`Duration`]
///
/// Supports the units `s`, `m`, `h` and `d`, case-insensitive, with surrounding whitespace ignored.
pub fn parse_kubernetes_duration(duration_str: &str) -> Result<Duration, DurationError> {
    let trimmed = duration_str.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }

    let lower = trimmed.to_lowercase();
    let captures = DURATION_REGEX
        .as_ref()
        .and_then(|regex| regex.captures(&lower))
        .ok_or_else(|| DurationError::InvalidFormat(trimmed.to_string()))?;

    let Ok(number) = captures["number"].parse::<u64>() else {
        return Err(DurationError::InvalidFormat(trimmed.to_string()));
    };
    if number == 0 {
        return Err(DurationError::Zero(trimmed.to_string()));
    }

    let multiplier = match &captures["unit"] {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86_400,
        _ => return Err(DurationError::InvalidFormat(trimmed.to_string())),
    };

    number
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| DurationError::InvalidFormat(trimmed.to_string()))
}
