//! Best-effort conversions from [`ConfigValue`] to concrete Rust types.
//!
//! Every `to_*` method returns `None` when the value cannot be converted.
//! The typed getters on [`Configuration`](crate::Configuration) turn `None`
//! into the target type's default, so lookups never fail.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use num_traits::ToPrimitive;

use crate::duration;
use crate::value::{ConfigValue, Map};

/// Naive datetime layouts tried after RFC 3339 and RFC 2822, read as UTC.
const NAIVE_DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts.
const ZONED_DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Date-only layouts, read as midnight UTC.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%Y/%m/%d"];

/// Generates integer `to_*` methods on top of `ToPrimitive`
macro_rules! impl_to_primitive {
    ($($method:ident -> $t:ty),+ $(,)?) => {
        $(
            #[doc = concat!("Converts to `", stringify!($t), "` if possible.")]
            ///
            /// Floats truncate toward zero, booleans map to `0`/`1`, and strings
            /// parse with optional `0x`/`0o`/`0b` prefixes.
            #[must_use]
            pub fn $method(&self) -> Option<$t> {
                match self {
                    ConfigValue::Integer(n) => n.$method(),

                    ConfigValue::Float(f) => f.$method(),

                    ConfigValue::String(s) => parse_integer(s).and_then(|n| n.$method()),

                    ConfigValue::Boolean(b) => Some(<$t>::from(*b)),

                    _ => None,
                }
            }
        )+
    };
}

impl ConfigValue {
    impl_to_primitive! {
        to_i32 -> i32,
        to_i64 -> i64,
        to_u32 -> u32,
        to_u64 -> u64,
    }

    /// Converts to `f64` if possible.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),

            ConfigValue::Integer(n) => n.to_f64(),

            ConfigValue::String(s) => s.trim().parse().ok(),

            ConfigValue::Boolean(b) => Some(f64::from(u8::from(*b))),

            _ => None,
        }
    }

    /// Converts to `bool` if possible.
    ///
    /// Numbers are `true` when non-zero. Strings accept `1`, `t`, `T`, `TRUE`,
    /// `true`, `True` and their `false` counterparts.
    #[must_use]
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),

            ConfigValue::Integer(n) => Some(*n != 0),

            ConfigValue::Float(f) => Some(*f != 0.0),

            ConfigValue::String(s) => parse_bool(s),

            _ => None,
        }
    }

    /// Renders a scalar as text.
    ///
    /// Lists and maps have no textual form and yield `None`.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            ConfigValue::String(s) => Some(s.clone()),

            ConfigValue::Boolean(b) => Some(b.to_string()),

            ConfigValue::Integer(n) => Some(n.to_string()),

            ConfigValue::Float(f) => Some(f.to_string()),

            ConfigValue::Null => Some(String::new()),

            ConfigValue::List(_) | ConfigValue::Map(_) => None,
        }
    }

    /// Converts to a [`Duration`] if possible.
    ///
    /// Numbers are nanosecond counts. Strings carrying a unit use the
    /// [`duration`](crate::duration) syntax; bare numeric strings are
    /// nanoseconds.
    #[must_use]
    pub fn to_duration(&self) -> Option<Duration> {
        match self {
            ConfigValue::Integer(n) => u64::try_from(*n).ok().map(Duration::from_nanos),

            ConfigValue::Float(f) => f.to_u64().map(Duration::from_nanos),

            ConfigValue::String(s) => {
                let s = s.trim();
                if duration::has_unit(s) {
                    duration::parse_duration(s)
                } else {
                    parse_integer(s)
                        .and_then(|n| u64::try_from(n).ok())
                        .map(Duration::from_nanos)
                }
            }

            _ => None,
        }
    }

    /// Converts to a UTC timestamp if possible.
    ///
    /// Integers are Unix seconds. Strings are tried against RFC 3339,
    /// RFC 2822, and a handful of common date and datetime layouts.
    #[must_use]
    pub fn to_time(&self) -> Option<DateTime<Utc>> {
        match self {
            ConfigValue::Integer(n) => Utc.timestamp_opt(*n, 0).single(),

            ConfigValue::Float(f) => f.to_i64().and_then(|n| Utc.timestamp_opt(n, 0).single()),

            ConfigValue::String(s) => parse_time(s.trim()),

            _ => None,
        }
    }

    /// Converts to a list of strings.
    ///
    /// A scalar string is split on whitespace.
    #[must_use]
    pub fn to_string_slice(&self) -> Option<Vec<String>> {
        match self {
            ConfigValue::List(items) => Some(
                items
                    .iter()
                    .map(|item| item.to_text().unwrap_or_default())
                    .collect(),
            ),

            ConfigValue::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),

            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn to_slice(&self) -> Option<Vec<ConfigValue>> {
        match self {
            ConfigValue::List(items) => Some(items.clone()),

            _ => None,
        }
    }

    /// Converts to a string-keyed map.
    ///
    /// A string holding a JSON object is decoded.
    #[must_use]
    pub fn to_string_map(&self) -> Option<Map> {
        match self {
            ConfigValue::Map(map) => Some(map.clone()),

            ConfigValue::String(s) => match serde_json::from_str::<ConfigValue>(s) {
                Ok(ConfigValue::Map(map)) => Some(map),

                _ => None,
            },

            _ => None,
        }
    }

    /// Converts to a map of strings.
    #[must_use]
    pub fn to_string_map_string(&self) -> Option<HashMap<String, String>> {
        self.to_string_map().map(|map| {
            map.into_iter()
                .map(|(k, v)| (k, v.to_text().unwrap_or_default()))
                .collect()
        })
    }

    /// Converts to a map of string lists.
    ///
    /// Scalar entries become one-element lists.
    #[must_use]
    pub fn to_string_map_string_slice(&self) -> Option<HashMap<String, Vec<String>>> {
        self.to_string_map().map(|map| {
            map.into_iter()
                .map(|(k, v)| {
                    let items = match &v {
                        ConfigValue::List(_) => v.to_string_slice().unwrap_or_default(),

                        other => vec![other.to_text().unwrap_or_default()],
                    };
                    (k, items)
                })
                .collect()
        })
    }

    /// Converts a list of maps.
    ///
    /// Items that are not maps become empty maps.
    #[must_use]
    pub fn to_slice_string_map(&self) -> Option<Vec<Map>> {
        match self {
            ConfigValue::List(items) => Some(
                items
                    .iter()
                    .map(|item| item.to_string_map().unwrap_or_default())
                    .collect(),
            ),

            _ => None,
        }
    }
}

/// Parses an integer literal with an optional sign and radix prefix.
///
/// A trailing all-zero fraction (`"12.00"`) is tolerated. A leading `0`
/// followed by digits is octal.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let text = trim_zero_decimal(text.trim());

    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),

        b'+' => (false, &text[1..]),

        _ => (false, text),
    };

    let lowered = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lowered.strip_prefix("0x") {
        (16, rest.to_string())
    } else if let Some(rest) = lowered.strip_prefix("0b") {
        (2, rest.to_string())
    } else if let Some(rest) = lowered.strip_prefix("0o") {
        (8, rest.to_string())
    } else if lowered.len() > 1 && lowered.starts_with('0') {
        (8, lowered[1..].to_string())
    } else {
        (10, lowered)
    };

    let digits = if radix == 10 {
        digits
    } else {
        digits.replace('_', "")
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(&digits, radix).ok()?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

fn trim_zero_decimal(text: &str) -> &str {
    match text.split_once('.') {
        Some((whole, fraction))
            if !whole.is_empty() && !fraction.is_empty() && fraction.bytes().all(|b| b == b'0') =>
        {
            whole
        }
        _ => text,
    }
}

/// Parses the accepted boolean spellings.
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),

        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),

        _ => None,
    }
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for layout in ZONED_DATETIME_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(text, layout) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for layout in NAIVE_DATETIME_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc());
        }
    }

    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
