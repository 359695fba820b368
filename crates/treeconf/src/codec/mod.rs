//! Payload decoders.
//!
//! A [`Decoder`] turns raw bytes into the generic nested [`Map`] that the
//! configuration tree merges. [`Format`] provides the built-in decoders;
//! any `Fn(&[u8]) -> Result<Map, DecodeError>` closure is a decoder too.
//!
//! # Supported Formats
//!
//! | Format | Feature | Extensions |
//! |--------|---------|------------|
//! | JSON | always | `.json` |
//! | TOML | `toml` | `.toml` |
//! | YAML | `yaml` | `.yaml`, `.yml` |
//!
//! # Example
//!
//! ```rust
//! use treeconf::{ConfigValue, Decoder, Format};
//!
//! let tree = Format::Json.decode(br#"{"server": {"port": 8080}}"#).unwrap();
//! let server = tree["server"].as_map().unwrap();
//!
//! assert_eq!(server["port"], ConfigValue::from(8080));
//! ```

mod error;
mod span;

use std::path::Path;

pub use error::DecodeError;

use crate::value::{ConfigValue, Map};

/// Transforms a raw payload into a nested configuration mapping.
pub trait Decoder: Send + Sync {
    /// Decodes `content`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the payload is malformed or its root is
    /// not a mapping.
    fn decode(&self, content: &[u8]) -> Result<Map, DecodeError>;
}

impl<F> Decoder for F
where
    F: Fn(&[u8]) -> Result<Map, DecodeError> + Send + Sync,
{
    fn decode(&self, content: &[u8]) -> Result<Map, DecodeError> {
        self(content)
    }
}

/// Built-in payload formats.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use treeconf::Format;
///
/// assert_eq!(Format::from_path(Path::new("app.json")), Some(Format::Json));
/// assert_eq!(Format::from_path(Path::new("app.txt")), None);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// JSON format (`.json` extension).
    Json,

    /// TOML format (`.toml` extension).
    ///
    /// Requires the `toml` feature flag.
    #[cfg(feature = "toml")]
    Toml,

    /// YAML format (`.yaml` or `.yml` extension).
    ///
    /// Requires the `yaml` feature flag.
    #[cfg(feature = "yaml")]
    Yaml,
}

impl Format {
    /// Detects the format from a file extension.
    ///
    /// Returns `None` if the extension is not recognized or if the
    /// required feature flag is not enabled.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;

        match ext.to_lowercase().as_str() {
            "json" => Some(Format::Json),

            #[cfg(feature = "toml")]
            "toml" => Some(Format::Toml),

            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(Format::Yaml),

            _ => None,
        }
    }

    /// Get the format name for error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "JSON",

            #[cfg(feature = "toml")]
            Format::Toml => "TOML",

            #[cfg(feature = "yaml")]
            Format::Yaml => "YAML",
        }
    }

    fn decode_value(self, content: &str) -> Result<ConfigValue, DecodeError> {
        match self {
            Format::Json => {
                serde_json::from_str(content).map_err(|e| span::json_error(&e, content))
            }

            // TOML datetimes deserialize as private marker tables; going
            // through `toml::Table` renders them as strings instead.
            #[cfg(feature = "toml")]
            Format::Toml => toml::from_str::<toml::Table>(content)
                .map(|table| ConfigValue::from(toml::Value::Table(table)))
                .map_err(|e| span::toml_error(&e, content)),

            #[cfg(feature = "yaml")]
            Format::Yaml => {
                serde_saphyr::from_str(content).map_err(|e| span::yaml_error(&e, content))
            }
        }
    }
}

impl Decoder for Format {
    fn decode(&self, content: &[u8]) -> Result<Map, DecodeError> {
        let text = std::str::from_utf8(content).map_err(|source| DecodeError::NotUtf8 {
            format: self.name(),
            source,
        })?;

        #[cfg(feature = "yaml")]
        if *self == Format::Yaml && text.trim().is_empty() {
            return Ok(Map::new());
        }

        match self.decode_value(text)? {
            ConfigValue::Map(map) => Ok(map),

            other => Err(DecodeError::NotAMapping {
                format: self.name(),
                found: other.type_name(),
            }),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
