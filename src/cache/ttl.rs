//! TTL Parsing Module
//!
//! Parses duration strings such as `"10ms"`, `"1h30m"` or `"1.5h"` into
//! [`Duration`] values.

use std::time::Duration;

use crate::error::{CacheError, Result};

// == Public Constants ==
/// TTL substituted when a caller passes a malformed TTL string.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

// Fraction digits past this point cannot change the result.
const MAX_FRACTION_DIGITS: usize = 18;

// == Parse Duration ==
/// Parses a duration string made of one or more `<decimal><unit>` groups.
///
/// Accepted units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A leading
/// sign is allowed; negative durations clamp to zero. The bare string `"0"`
/// needs no unit.
///
/// # Errors
/// Returns [`CacheError::MalformedTtl`] for empty input, a missing or unknown
/// unit, or a total that overflows 64-bit signed nanoseconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let malformed = || CacheError::MalformedTtl(input.to_string());

    let mut rest = input;
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(malformed());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let (whole_digits, after) = split_digits(rest);
        rest = after;

        let mut fraction_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, after) = split_digits(after_dot);
            fraction_digits = digits;
            rest = after;
        }

        if whole_digits.is_empty() && fraction_digits.is_empty() {
            return Err(malformed());
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after) = rest.split_at(unit_len);
        rest = after;
        let unit_nanos = unit_nanos(unit).ok_or_else(malformed)?;

        let whole: u64 = if whole_digits.is_empty() {
            0
        } else {
            whole_digits.parse().map_err(|_| malformed())?
        };

        let group = whole
            .checked_mul(unit_nanos)
            .and_then(|v| v.checked_add(fraction_nanos(fraction_digits, unit_nanos)))
            .ok_or_else(malformed)?;

        total = total
            .checked_add(group)
            .filter(|t| *t <= i64::MAX as u64)
            .ok_or_else(malformed)?;
    }

    if negative {
        return Ok(Duration::ZERO);
    }
    Ok(Duration::from_nanos(total))
}

// == Parse Or Default ==
/// Parses `input`, substituting `fallback` when it is malformed.
pub fn parse_or(input: &str, fallback: Duration) -> Duration {
    match parse_duration(input) {
        Ok(ttl) => ttl,
        Err(e) => {
            tracing::debug!("{}; using {:?}", e, fallback);
            fallback
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(len)
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(60 * 60 * NANOS_PER_SECOND),
        _ => None,
    }
}

/// Nanoseconds contributed by the digits after the decimal point, truncated.
fn fraction_nanos(digits: &str, unit_nanos: u64) -> u64 {
    let digits = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
    if digits.is_empty() {
        return 0;
    }
    let numerator: u128 = digits.parse().unwrap_or(0);
    let scale = 10u128.pow(digits.len() as u32);
    (numerator * unit_nanos as u128 / scale) as u64
}
