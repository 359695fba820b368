//! Decoding configuration values into typed structures.
//!
//! [`from_value`] drives any [`DeserializeOwned`] type from a [`ConfigValue`]
//! through a serde [`Deserializer`] that understands the loose shapes found
//! in configuration files:
//!
//! - Struct fields match map keys case-insensitively when no exact key is
//!   present (disable with [`DecodeOptions::case_insensitive`]).
//! - [`std::time::Duration`] fields accept unit-suffixed text such as
//!   `"1m30s"` or an integer nanosecond count.
//! - Floats truncate into integer targets.
//! - An explicit `null` decodes to the zero value of scalar targets and to
//!   an empty sequence or map.
//! - With [`DecodeOptions::weakly_typed_input`], scalars convert freely
//!   between strings, numbers and booleans, and a single scalar decodes into
//!   a one-element sequence.
//!
//! Field renames and embedded structs are expressed with
//! `#[serde(rename = "...")]` and `#[serde(flatten)]`. Missing fields follow
//! serde: mark them `#[serde(default)]` to keep their zero value.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use serde::Deserialize;
//! use treeconf::{ConfigValue, DecodeOptions, Map, de::from_value};
//!
//! #[derive(Deserialize)]
//! struct Server {
//!     port: u16,
//!     timeout: Duration,
//! }
//!
//! let value: Map = serde_json::from_str(r#"{"Port": "8080", "timeout": "1m30s"}"#).unwrap();
//! let options = DecodeOptions::default().weakly_typed_input(true);
//!
//! let server: Server = from_value(ConfigValue::Map(value), &options).unwrap();
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.timeout, Duration::from_secs(90));
//! ```

use std::collections::HashSet;
use std::fmt::{self, Display};

use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, EnumAccess, Error as _, Expected,
    IntoDeserializer, MapAccess, SeqAccess, Unexpected, VariantAccess, Visitor,
};

use crate::cast;
use crate::duration;
use crate::value::{ConfigValue, Map};

// ============================================================================
// Options
// ============================================================================

/// Knobs for struct decoding.
///
/// Field naming and embedding are not options here; they are declared on
/// the target type and honored by the decoder:
///
/// - a field tag name is `#[serde(rename = "...")]`,
/// - squashing an embedded struct into its parent is `#[serde(flatten)]`.
///
/// ```rust
/// use serde::Deserialize;
/// use treeconf::Configuration;
///
/// #[derive(Deserialize)]
/// struct Pool {
///     #[serde(rename = "max_conns")]
///     max: u32,
/// }
///
/// #[derive(Deserialize)]
/// struct Db {
///     host: String,
///     #[serde(flatten)]
///     pool: Pool,
/// }
///
/// let config = Configuration::new();
/// config.set("db.host", "localhost");
/// config.set("db.max_conns", 16);
///
/// let db: Db = config.unmarshal_key("db")?;
/// assert_eq!((db.host.as_str(), db.pool.max), ("localhost", 16));
/// # Ok::<(), treeconf::Error>(())
/// ```
///
/// # Example
///
/// ```rust
/// use treeconf::DecodeOptions;
///
/// let options = DecodeOptions::default().weakly_typed_input(true);
///
/// assert!(options.weakly_typed_input);
/// assert!(options.case_insensitive);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Convert between strings, numbers and booleans as needed.
    ///
    /// Defaults to `false`.
    pub weakly_typed_input: bool,

    /// Match struct fields to map keys ignoring case.
    ///
    /// Defaults to `true`.
    pub case_insensitive: bool,
}

impl DecodeOptions {
    /// Sets [`weakly_typed_input`](Self::weakly_typed_input).
    #[must_use]
    pub const fn weakly_typed_input(mut self, enabled: bool) -> Self {
        self.weakly_typed_input = enabled;
        self
    }

    /// Sets [`case_insensitive`](Self::case_insensitive).
    #[must_use]
    pub const fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            weakly_typed_input: false,
            case_insensitive: true,
        }
    }
}

/// Map keys are always text, so they are read weakly into numeric or
/// boolean key types.
static KEY_OPTIONS: DecodeOptions = DecodeOptions {
    weakly_typed_input: true,
    case_insensitive: false,
};

// ============================================================================
// Errors
// ============================================================================

/// Error raised while decoding a [`ConfigValue`] into a Rust type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DeError {
    message: String,
}

impl DeError {
    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl de::Error for DeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self {
            message: msg.to_string(),
        }
    }
}

/// Decodes `value` into `T`, tracking the path to any failure.
///
/// # Errors
///
/// Returns the failing path (such as `server.port`) together with the
/// underlying [`DeError`].
pub fn from_value<T: DeserializeOwned>(
    value: ConfigValue,
    options: &DecodeOptions,
) -> Result<T, serde_path_to_error::Error<DeError>> {
    serde_path_to_error::deserialize(ValueDeserializer::new(value, options))
}

// ============================================================================
// Deserializer
// ============================================================================

/// A serde [`Deserializer`] over an owned [`ConfigValue`].
pub struct ValueDeserializer<'o> {
    value: ConfigValue,
    options: &'o DecodeOptions,
}

impl<'o> ValueDeserializer<'o> {
    /// Wraps `value` for decoding with `options`.
    #[must_use]
    pub const fn new(value: ConfigValue, options: &'o DecodeOptions) -> Self {
        Self { value, options }
    }

    fn weak(&self) -> bool {
        self.options.weakly_typed_input
    }

    fn invalid(&self, exp: &dyn Expected) -> DeError {
        DeError::invalid_type(self.value.unexpected(), exp)
    }

    fn integer(&self, exp: &dyn Expected) -> Result<i128, DeError> {
        match &self.value {
            ConfigValue::Integer(n) => Ok(i128::from(*n)),

            ConfigValue::Float(f) if f.is_finite() => Ok(f.trunc() as i128),

            ConfigValue::Null => Ok(0),

            ConfigValue::Boolean(b) if self.weak() => Ok(i128::from(*b)),

            ConfigValue::String(s) if self.weak() && s.is_empty() => Ok(0),

            ConfigValue::String(s) if self.weak() => cast::parse_integer(s)
                .map(i128::from)
                .ok_or_else(|| DeError::invalid_value(Unexpected::Str(s), exp)),

            _ => Err(self.invalid(exp)),
        }
    }

    fn float(&self, exp: &dyn Expected) -> Result<f64, DeError> {
        match &self.value {
            ConfigValue::Float(f) => Ok(*f),

            #[allow(clippy::cast_precision_loss)]
            ConfigValue::Integer(n) => Ok(*n as f64),

            ConfigValue::Null => Ok(0.0),

            ConfigValue::Boolean(b) if self.weak() => Ok(if *b { 1.0 } else { 0.0 }),

            ConfigValue::String(s) if self.weak() && s.is_empty() => Ok(0.0),

            ConfigValue::String(s) if self.weak() => s
                .trim()
                .parse()
                .map_err(|_| DeError::invalid_value(Unexpected::Str(s), exp)),

            _ => Err(self.invalid(exp)),
        }
    }
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident($t:ty)),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
                let n = self.integer(&visitor)?;
                let n = <$t>::try_from(n).map_err(|_| {
                    DeError::invalid_value(Unexpected::Other("out-of-range integer"), &visitor)
                })?;

                visitor.$visit(n)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ValueDeserializer<'_> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let options = self.options;

        match self.value {
            ConfigValue::Null => visitor.visit_unit(),

            ConfigValue::Boolean(b) => visitor.visit_bool(b),

            ConfigValue::Integer(n) => visitor.visit_i64(n),

            ConfigValue::Float(f) => visitor.visit_f64(f),

            ConfigValue::String(s) => visitor.visit_string(s),

            ConfigValue::List(items) => visitor.visit_seq(SeqDeserializer::new(items, options)),

            ConfigValue::Map(map) => {
                visitor.visit_map(MapDeserializer::new(map.into_iter().collect(), options))
            }
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let b = match &self.value {
            ConfigValue::Boolean(b) => *b,

            ConfigValue::Null => false,

            ConfigValue::Integer(n) if self.weak() => *n != 0,

            ConfigValue::Float(f) if self.weak() => *f != 0.0,

            ConfigValue::String(s) if self.weak() && s.is_empty() => false,

            ConfigValue::String(s) if self.weak() => cast::parse_bool(s)
                .ok_or_else(|| DeError::invalid_value(Unexpected::Str(s), &visitor))?,

            _ => return Err(self.invalid(&visitor)),
        };

        visitor.visit_bool(b)
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
    }

    #[allow(clippy::cast_possible_truncation)]
    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let f = self.float(&visitor)?;
        visitor.visit_f32(f as f32)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let f = self.float(&visitor)?;
        visitor.visit_f64(f)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_string(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let weak = self.weak();

        match self.value {
            ConfigValue::String(s) => visitor.visit_string(s),

            ConfigValue::Null => visitor.visit_string(String::new()),

            ConfigValue::Boolean(b) if weak => visitor.visit_str(if b { "1" } else { "0" }),

            ConfigValue::Integer(n) if weak => visitor.visit_string(n.to_string()),

            ConfigValue::Float(f) if weak => visitor.visit_string(f.to_string()),

            other => Err(DeError::invalid_type(other.unexpected(), &visitor)),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            ConfigValue::String(s) => visitor.visit_byte_buf(s.into_bytes()),

            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            ConfigValue::Null => visitor.visit_none(),

            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.value {
            ConfigValue::Null => visitor.visit_unit(),

            _ => Err(self.invalid(&visitor)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let options = self.options;
        let weak = self.weak();

        match self.value {
            ConfigValue::List(items) => visitor.visit_seq(SeqDeserializer::new(items, options)),

            ConfigValue::Null => visitor.visit_seq(SeqDeserializer::new(Vec::new(), options)),

            ConfigValue::Map(map) if weak && map.is_empty() => {
                visitor.visit_seq(SeqDeserializer::new(Vec::new(), options))
            }

            scalar @ (ConfigValue::Boolean(_)
            | ConfigValue::Integer(_)
            | ConfigValue::Float(_)
            | ConfigValue::String(_))
                if weak =>
            {
                visitor.visit_seq(SeqDeserializer::new(vec![scalar], options))
            }

            other => Err(DeError::invalid_type(other.unexpected(), &visitor)),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let options = self.options;
        let weak = self.weak();

        match self.value {
            ConfigValue::Map(map) => {
                visitor.visit_map(MapDeserializer::new(map.into_iter().collect(), options))
            }

            ConfigValue::Null => visitor.visit_map(MapDeserializer::new(Vec::new(), options)),

            ConfigValue::List(items) if weak && items.is_empty() => {
                visitor.visit_map(MapDeserializer::new(Vec::new(), options))
            }

            other => Err(DeError::invalid_type(other.unexpected(), &visitor)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        if is_duration(name, fields) {
            return self.deserialize_duration(visitor);
        }

        let options = self.options;

        match self.value {
            ConfigValue::Map(map) => {
                let entries = if options.case_insensitive {
                    fold_keys(map, fields)
                } else {
                    map.into_iter().collect()
                };

                visitor.visit_map(MapDeserializer::new(entries, options))
            }

            ConfigValue::Null => visitor.visit_map(MapDeserializer::new(Vec::new(), options)),

            ConfigValue::List(items) => visitor.visit_seq(SeqDeserializer::new(items, options)),

            other => Err(DeError::invalid_type(other.unexpected(), &visitor)),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        let options = self.options;

        match self.value {
            ConfigValue::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
                options,
            }),

            ConfigValue::Map(map) if map.len() == 1 => {
                let Some((variant, value)) = map.into_iter().next() else {
                    return Err(DeError::custom("empty enum map"));
                };

                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                    options,
                })
            }

            other => Err(DeError::invalid_type(other.unexpected(), &visitor)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        visitor.visit_unit()
    }
}

impl ValueDeserializer<'_> {
    /// Feeds a textual or integer duration to `Duration`'s visitor as its
    /// `{secs, nanos}` map; anything else goes through unchanged.
    fn deserialize_duration<'de, V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        let parsed = match &self.value {
            ConfigValue::String(s) => {
                let parsed = duration::parse_duration(s).ok_or_else(|| {
                    DeError::invalid_value(Unexpected::Str(s), &"a duration such as \"1m30s\"")
                })?;
                Some(parsed)
            }

            ConfigValue::Integer(n) => {
                let nanos = u64::try_from(*n).map_err(|_| {
                    DeError::invalid_value(Unexpected::Signed(*n), &"a non-negative duration")
                })?;
                Some(std::time::Duration::from_nanos(nanos))
            }

            ConfigValue::Null => Some(std::time::Duration::ZERO),

            _ => None,
        };

        let Some(parsed) = parsed else {
            let options = self.options;
            return match self.value {
                ConfigValue::Map(map) => {
                    visitor.visit_map(MapDeserializer::new(map.into_iter().collect(), options))
                }

                ConfigValue::List(items) => visitor.visit_seq(SeqDeserializer::new(items, options)),

                other => Err(DeError::invalid_type(other.unexpected(), &visitor)),
            };
        };

        let entries = vec![
            ("secs".to_string(), ConfigValue::from(parsed.as_secs())),
            ("nanos".to_string(), ConfigValue::from(parsed.subsec_nanos())),
        ];
        visitor.visit_map(MapDeserializer::new(entries, self.options))
    }
}

fn is_duration(name: &str, fields: &[&str]) -> bool {
    name == "Duration" && fields == ["secs", "nanos"]
}

/// Renames keys that match a struct field only when case is ignored.
///
/// Exact matches win; a field claimed once is not claimed again.
fn fold_keys(map: Map, fields: &[&str]) -> Vec<(String, ConfigValue)> {
    let mut claimed: HashSet<&str> = fields
        .iter()
        .copied()
        .filter(|field| map.contains_key(*field))
        .collect();

    map.into_iter()
        .map(|(key, value)| {
            if fields.contains(&key.as_str()) {
                return (key, value);
            }

            let folded = key.to_lowercase();
            let target = fields
                .iter()
                .copied()
                .find(|field| !claimed.contains(field) && field.to_lowercase() == folded);

            match target {
                Some(field) => {
                    claimed.insert(field);
                    (field.to_string(), value)
                }

                None => (key, value),
            }
        })
        .collect()
}

// ============================================================================
// Access helpers
// ============================================================================

struct SeqDeserializer<'o> {
    iter: std::vec::IntoIter<ConfigValue>,
    options: &'o DecodeOptions,
}

impl<'o> SeqDeserializer<'o> {
    fn new(items: Vec<ConfigValue>, options: &'o DecodeOptions) -> Self {
        Self {
            iter: items.into_iter(),
            options,
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'_> {
    type Error = DeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DeError> {
        self.iter
            .next()
            .map(|item| seed.deserialize(ValueDeserializer::new(item, self.options)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer<'o> {
    iter: std::vec::IntoIter<(String, ConfigValue)>,
    pending: Option<ConfigValue>,
    options: &'o DecodeOptions,
}

impl<'o> MapDeserializer<'o> {
    fn new(entries: Vec<(String, ConfigValue)>, options: &'o DecodeOptions) -> Self {
        Self {
            iter: entries.into_iter(),
            pending: None,
            options,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer<'_> {
    type Error = DeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, DeError> {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };

        self.pending = Some(value);
        seed.deserialize(ValueDeserializer::new(ConfigValue::String(key), &KEY_OPTIONS))
            .map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DeError> {
        let value = self
            .pending
            .take()
            .ok_or_else(|| <DeError as de::Error>::custom("value requested before key"))?;

        seed.deserialize(ValueDeserializer::new(value, self.options))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer<'o> {
    variant: String,
    value: Option<ConfigValue>,
    options: &'o DecodeOptions,
}

impl<'de, 'o> EnumAccess<'de> for EnumDeserializer<'o> {
    type Error = DeError;
    type Variant = VariantDeserializer<'o>;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant), DeError> {
        let name: de::value::StringDeserializer<DeError> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;

        Ok((
            variant,
            VariantDeserializer {
                value: self.value,
                options: self.options,
            },
        ))
    }
}

struct VariantDeserializer<'o> {
    value: Option<ConfigValue>,
    options: &'o DecodeOptions,
}

impl VariantDeserializer<'_> {
    fn into_value(self, exp: &dyn Expected) -> Result<ConfigValue, DeError> {
        self.value
            .ok_or_else(|| DeError::invalid_type(Unexpected::UnitVariant, exp))
    }
}

impl<'de> VariantAccess<'de> for VariantDeserializer<'_> {
    type Error = DeError;

    fn unit_variant(self) -> Result<(), DeError> {
        match self.value {
            None | Some(ConfigValue::Null) => Ok(()),

            Some(other) => Err(DeError::invalid_type(other.unexpected(), &"unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, DeError> {
        let options = self.options;
        let value = self.into_value(&"newtype variant")?;

        seed.deserialize(ValueDeserializer::new(value, options))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, DeError> {
        let options = self.options;
        let value = self.into_value(&visitor)?;

        ValueDeserializer::new(value, options).deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DeError> {
        let options = self.options;
        let value = self.into_value(&visitor)?;

        ValueDeserializer::new(value, options).deserialize_struct("", fields, visitor)
    }
}

impl fmt::Debug for ValueDeserializer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueDeserializer")
            .field("value", &self.value)
            .field("options", self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use serde::Deserialize;

    use super::*;

    fn value(json: &str) -> ConfigValue {
        serde_json::from_str(json).unwrap()
    }

    fn strict() -> DecodeOptions {
        DecodeOptions::default()
    }

    fn weak() -> DecodeOptions {
        DecodeOptions::default().weakly_typed_input(true)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Server {
        host: String,
        port: u16,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn test_plain_struct() {
        let server: Server = from_value(value(r#"{"host": "a", "port": 80}"#), &strict()).unwrap();

        assert_eq!(
            server,
            Server {
                host: "a".into(),
                port: 80,
                tags: vec![]
            }
        );
    }

    #[test]
    fn test_case_insensitive_fields() {
        let server: Server = from_value(value(r#"{"HOST": "a", "Port": 80}"#), &strict()).unwrap();
        assert_eq!(server.host, "a");

        let exact = strict().case_insensitive(false);
        assert!(from_value::<Server>(value(r#"{"HOST": "a", "port": 80}"#), &exact).is_err());
    }

    #[test]
    fn test_exact_key_wins_over_folded() {
        let server: Server =
            from_value(value(r#"{"host": "exact", "HOST": "folded", "port": 1}"#), &strict()).unwrap();

        assert_eq!(server.host, "exact");
    }

    #[test]
    fn test_strict_rejects_string_number() {
        let err = from_value::<Server>(value(r#"{"host": "a", "port": "80"}"#), &strict()).unwrap_err();

        assert_eq!(err.path().to_string(), "port");
    }

    #[test]
    fn test_weak_conversions() {
        #[derive(Deserialize)]
        struct Loose {
            port: u16,
            enabled: bool,
            name: String,
            ratio: f64,
            tags: Vec<String>,
        }

        let loose: Loose = from_value(
            value(r#"{"port": "0x50", "enabled": "T", "name": 7, "ratio": "0.5", "tags": "solo"}"#),
            &weak(),
        )
        .unwrap();

        assert_eq!(loose.port, 80);
        assert!(loose.enabled);
        assert_eq!(loose.name, "7");
        assert!((loose.ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(loose.tags, vec!["solo".to_string()]);
    }

    #[test]
    fn test_float_truncates_into_integer() {
        let n: i32 = from_value(ConfigValue::Float(3.9), &strict()).unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn test_integer_out_of_range() {
        assert!(from_value::<u8>(ConfigValue::Integer(300), &strict()).is_err());
        assert!(from_value::<u32>(ConfigValue::Integer(-1), &strict()).is_err());
    }

    #[test]
    fn test_null_is_zero_value() {
        assert_eq!(from_value::<i64>(ConfigValue::Null, &strict()).unwrap(), 0);
        assert_eq!(from_value::<String>(ConfigValue::Null, &strict()).unwrap(), "");
        assert_eq!(from_value::<Option<u8>>(ConfigValue::Null, &strict()).unwrap(), None);
        assert!(from_value::<Vec<u8>>(ConfigValue::Null, &strict()).unwrap().is_empty());
    }

    #[test]
    fn test_duration_hook() {
        #[derive(Deserialize)]
        struct Timeouts {
            read: Duration,
            write: Duration,
            idle: Option<Duration>,
        }

        let t: Timeouts = from_value(
            value(r#"{"read": "1.5s", "write": 2000000, "idle": "1h"}"#),
            &strict(),
        )
        .unwrap();

        assert_eq!(t.read, Duration::from_millis(1500));
        assert_eq!(t.write, Duration::from_millis(2));
        assert_eq!(t.idle, Some(Duration::from_secs(3600)));

        assert!(from_value::<Duration>(ConfigValue::from("later"), &strict()).is_err());
    }

    #[test]
    fn test_map_with_numeric_keys() {
        let ports: HashMap<u16, String> = from_value(value(r#"{"80": "http", "443": "https"}"#), &strict()).unwrap();

        assert_eq!(ports[&443], "https");
    }

    #[test]
    fn test_enums() {
        #[derive(Debug, Deserialize, PartialEq)]
        #[serde(rename_all = "lowercase")]
        enum Level {
            Debug,
            Info,
            Custom(u8),
        }

        assert_eq!(from_value::<Level>(ConfigValue::from("info"), &strict()).unwrap(), Level::Info);
        assert_eq!(
            from_value::<Level>(value(r#"{"custom": 3}"#), &strict()).unwrap(),
            Level::Custom(3)
        );
        assert!(from_value::<Level>(ConfigValue::from("trace"), &strict()).is_err());
        assert_ne!(from_value::<Level>(ConfigValue::from("debug"), &strict()).unwrap(), Level::Info);
    }

    #[test]
    fn test_rename_and_flatten() {
        #[derive(Deserialize)]
        struct Inner {
            level: String,
        }

        #[derive(Deserialize)]
        struct Outer {
            #[serde(rename = "listen_addr")]
            addr: String,
            #[serde(flatten)]
            inner: Inner,
        }

        let outer: Outer =
            from_value(value(r#"{"listen_addr": ":80", "level": "warn"}"#), &strict()).unwrap();

        assert_eq!(outer.addr, ":80");
        assert_eq!(outer.inner.level, "warn");
    }

    #[test]
    fn test_error_path_is_nested() {
        #[derive(Debug, Deserialize)]
        struct Root {
            #[allow(dead_code)]
            server: Server,
        }

        let err = from_value::<Root>(value(r#"{"server": {"host": "a", "port": true}}"#), &strict())
            .unwrap_err();

        assert_eq!(err.path().to_string(), "server.port");
    }
}
