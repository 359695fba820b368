//! Dynamically typed configuration values.
//!
//! Every payload format decodes into [`ConfigValue`], and every tree operation
//! (merge, flatten, change detection) pattern-matches on it. A node is
//! either a scalar, a list, or a nested [`Map`].
//!
//! # Example
//!
//! ```rust
//! use treeconf::ConfigValue;
//!
//! let value = ConfigValue::from(8080);
//! assert_eq!(value.to_i64(), Some(8080));
//! assert!(ConfigValue::Null.is_null());
//! ```

use std::collections::HashMap;
use std::fmt::{self, Formatter};

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Unexpected, Visitor};

/// A nested configuration mapping, the shape of every tree node.
pub type Map = HashMap<String, ConfigValue>;

// ============================================================================
// Macros for reducing boilerplate
// ============================================================================

/// Generates lossless `From<T>` implementations for integer types
macro_rules! impl_from_integer {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for ConfigValue {
                fn from(n: $t) -> Self {
                    ConfigValue::Integer(i64::from(n))
                }
            }
        )+
    };
}

// ============================================================================
// ConfigValue Enum
// ============================================================================

/// A type-erased configuration value.
///
/// | Variant | Produced from |
/// |---------|---------------|
/// | `Null` | `null`, `~`, a missing key |
/// | `Boolean` | `true` / `false` |
/// | `Integer` | integers that fit in `i64` |
/// | `Float` | floats, and integers too large for `i64` |
/// | `String` | strings (TOML datetimes are rendered to text) |
/// | `List` | arrays / sequences |
/// | `Map` | objects / tables / mappings |
///
/// Equality is structural and strict: `Integer(1)` and `Float(1.0)` differ.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConfigValue {
    /// No value.
    #[default]
    Null,

    /// A boolean value.
    Boolean(bool),

    /// A signed integer.
    Integer(i64),

    /// A floating-point value.
    Float(f64),

    /// A string value.
    String(String),

    /// A sequence of values.
    List(Vec<ConfigValue>),

    /// A nested mapping.
    Map(Map),
}

impl ConfigValue {
    /// Returns `true` for [`ConfigValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Returns `true` if this value is a nested mapping.
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, ConfigValue::Map(_))
    }

    /// Borrows the nested mapping, if this is one.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        match self {
            ConfigValue::Map(map) => Some(map),

            _ => None,
        }
    }

    /// Borrows the string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),

            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",

            ConfigValue::Boolean(_) => "boolean",

            ConfigValue::Integer(_) => "integer",

            ConfigValue::Float(_) => "float",

            ConfigValue::String(_) => "string",

            ConfigValue::List(_) => "list",

            ConfigValue::Map(_) => "map",
        }
    }

    /// Describes this value for serde type errors.
    pub(crate) fn unexpected(&self) -> Unexpected<'_> {
        match self {
            ConfigValue::Null => Unexpected::Unit,

            ConfigValue::Boolean(b) => Unexpected::Bool(*b),

            ConfigValue::Integer(n) => Unexpected::Signed(*n),

            ConfigValue::Float(f) => Unexpected::Float(*f),

            ConfigValue::String(s) => Unexpected::Str(s),

            ConfigValue::List(_) => Unexpected::Seq,

            ConfigValue::Map(_) => Unexpected::Map,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for ConfigValue {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(ConfigValue::Float(n as f64), ConfigValue::Integer)
    }
}

impl From<usize> for ConfigValue {
    fn from(n: usize) -> Self {
        ConfigValue::from(n as u64)
    }
}

impl From<isize> for ConfigValue {
    fn from(n: isize) -> Self {
        ConfigValue::Integer(n as i64)
    }
}

impl From<f32> for ConfigValue {
    fn from(f: f32) -> Self {
        ConfigValue::Float(f64::from(f))
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Boolean(b)
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<Map> for ConfigValue {
    fn from(map: Map) -> Self {
        ConfigValue::Map(map)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ConfigValue::Null, Into::into)
    }
}

#[cfg(feature = "toml")]
impl From<toml::Value> for ConfigValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => ConfigValue::String(s),

            toml::Value::Integer(i) => ConfigValue::Integer(i),

            toml::Value::Float(f) => ConfigValue::Float(f),

            toml::Value::Boolean(b) => ConfigValue::Boolean(b),

            toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),

            toml::Value::Array(arr) => {
                ConfigValue::List(arr.into_iter().map(ConfigValue::from).collect())
            }

            toml::Value::Table(table) => ConfigValue::Map(
                table
                    .into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// Deserialization from any self-describing format
// ============================================================================

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("any configuration value")
    }

    fn visit_bool<E>(self, b: bool) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Boolean(b))
    }

    fn visit_i64<E>(self, n: i64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Integer(n))
    }

    fn visit_u64<E>(self, n: u64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::from(n))
    }

    fn visit_f64<E>(self, f: f64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Float(f))
    }

    fn visit_str<E>(self, s: &str) -> Result<ConfigValue, E> {
        Ok(ConfigValue::String(s.to_string()))
    }

    fn visit_string<E>(self, s: String) -> Result<ConfigValue, E> {
        Ok(ConfigValue::String(s))
    }

    fn visit_unit<E>(self) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_none<E>(self) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<ConfigValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        ConfigValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<ConfigValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigValue::List(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<ConfigValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(MapKey(key)) = access.next_key()? {
            let value = access.next_value()?;
            map.insert(key, value);
        }
        Ok(ConfigValue::Map(map))
    }
}

/// A mapping key. YAML allows scalar keys of any type; they are stringified.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MapKeyVisitor)
    }
}

struct MapKeyVisitor;

impl Visitor<'_> for MapKeyVisitor {
    type Value = MapKey;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar mapping key")
    }

    fn visit_bool<E>(self, b: bool) -> Result<MapKey, E> {
        Ok(MapKey(b.to_string()))
    }

    fn visit_i64<E>(self, n: i64) -> Result<MapKey, E> {
        Ok(MapKey(n.to_string()))
    }

    fn visit_u64<E>(self, n: u64) -> Result<MapKey, E> {
        Ok(MapKey(n.to_string()))
    }

    fn visit_f64<E>(self, f: f64) -> Result<MapKey, E> {
        Ok(MapKey(f.to_string()))
    }

    fn visit_str<E>(self, s: &str) -> Result<MapKey, E> {
        Ok(MapKey(s.to_string()))
    }

    fn visit_string<E>(self, s: String) -> Result<MapKey, E> {
        Ok(MapKey(s))
    }

    fn visit_unit<E: de::Error>(self) -> Result<MapKey, E> {
        Err(E::invalid_type(Unexpected::Unit, &self))
    }
}
