//! Duration strings from proxy metadata
//!
//! Proxies advertise overrides such as the TCP idle timeout as Go-style
//! duration strings: a sequence of decimal numbers, each with an optional
//! fraction and a unit suffix (`300ms`, `1.5h`, `2h45m`). Valid units are
//! `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A leading sign is allowed and
//! the bare string `0` means zero.

use std::time::Duration;

use crate::errors::{Error, Result};

/// Duration parsed from metadata, keeping the sign the input carried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedDuration {
    pub negative: bool,
    pub magnitude: Duration,
}

impl SignedDuration {
    /// The duration when it is strictly positive
    pub fn positive(self) -> Option<Duration> {
        if self.negative || self.magnitude.is_zero() {
            None
        } else {
            Some(self.magnitude)
        }
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

fn invalid(value: &str, reason: &str) -> Error {
    Error::validation(format!("Invalid duration '{}': {}", value, reason))
}

/// Parse a Go-style duration string
pub fn parse_duration(value: &str) -> Result<SignedDuration> {
    let mut rest = value;
    let mut negative = false;

    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(SignedDuration { negative, magnitude: Duration::ZERO });
    }
    if rest.is_empty() {
        return Err(invalid(value, "empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_number) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len =
                    after_dot.find(|c: char| !c.is_ascii_digit()).unwrap_or(after_dot.len());
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid(value, "expected a number"));
        }

        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, remainder) = after_number.split_at(unit_len);
        if unit.is_empty() {
            return Err(invalid(value, "missing unit"));
        }
        let scale = unit_nanos(unit).ok_or_else(|| invalid(value, "unknown unit"))?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid(value, "number out of range"))?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(|| invalid(value, "overflow"))?;

        if !frac_part.is_empty() {
            // Only the digits that can still contribute at nanosecond scale matter
            let digits = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 =
                digits.parse().map_err(|_| invalid(value, "number out of range"))?;
            let denominator = 10u128.pow(digits.len() as u32);
            nanos += numerator * scale / denominator;
        }

        total = total.checked_add(nanos).ok_or_else(|| invalid(value, "overflow"))?;
        rest = remainder;
    }

    // Same range as a signed 64-bit nanosecond count
    let limit = if negative { 1u128 << 63 } else { i64::MAX as u128 };
    if total > limit {
        return Err(invalid(value, "overflow"));
    }

    let magnitude = Duration::new((total / 1_000_000_000) as u64, (total % 1_000_000_000) as u32);
    Ok(SignedDuration { negative, magnitude })
}

/// Parse `value` and keep it only when it is a strictly positive duration
pub fn parse_positive_duration(value: &str) -> Option<Duration> {
    parse_duration(value).ok().and_then(SignedDuration::positive)
}
