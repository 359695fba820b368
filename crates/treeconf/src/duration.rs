//! Textual duration parsing.
//!
//! Accepts the compact unit-suffixed syntax common in configuration files:
//! a sequence of decimal numbers, each with an optional fraction and a unit
//! suffix, such as `"300ms"`, `"1.5h"` or `"2h45m30s"`.
//!
//! | Unit | Meaning |
//! |------|---------|
//! | `ns` | nanoseconds |
//! | `us`, `µs`, `μs` | microseconds |
//! | `ms` | milliseconds |
//! | `s` | seconds |
//! | `m` | minutes |
//! | `h` | hours |
//!
//! The bare string `"0"` is also accepted. Negative durations cannot be
//! represented by [`Duration`] and are rejected.

use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parses a unit-suffixed duration string.
///
/// Returns `None` when the text is malformed, negative, or overflows.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use treeconf::duration::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
/// assert_eq!(parse_duration("soon"), None);
/// ```
#[must_use]
pub fn parse_duration(text: &str) -> Option<Duration> {
    let mut rest = text.trim();

    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else if rest.starts_with('-') {
        return (&rest[1..] == "0").then_some(Duration::ZERO);
    }

    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_frac) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let unit_len = after_frac
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_frac.len());
        let (unit, remaining) = after_frac.split_at(unit_len);
        let scale = unit_scale(unit)?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        total = total.checked_add(whole.checked_mul(scale)?)?;

        if !frac_part.is_empty() {
            // Keep at most 18 fractional digits; anything finer is below a nanosecond.
            let digits = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 = digits.parse().ok()?;
            let denominator = 10u128.checked_pow(u32::try_from(digits.len()).ok()?)?;
            total = total.checked_add(numerator.checked_mul(scale)? / denominator)?;
        }

        rest = remaining;
    }

    let nanos = u64::try_from(total).ok()?;
    Some(Duration::from_nanos(nanos))
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),

        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),

        "ms" => Some(NANOS_PER_MILLI),

        "s" => Some(NANOS_PER_SEC),

        "m" => Some(60 * NANOS_PER_SEC),

        "h" => Some(3600 * NANOS_PER_SEC),

        _ => None,
    }
}

/// Returns `true` if the text carries a duration unit character.
///
/// Strings without one are read as a plain nanosecond count.
pub(crate) fn has_unit(text: &str) -> bool {
    text.contains(['n', 's', 'u', 'µ', 'μ', 'm', 'h'])
}
