//! Decode error types with rich diagnostics.

use miette::{Diagnostic, NamedSource, SourceSpan};

/// Name shown in diagnostics for the decoded payload.
pub(crate) const PAYLOAD_NAME: &str = "<payload>";

/// Error returned when a payload cannot be decoded into a configuration tree.
///
/// Syntax errors carry the payload and a span so that [`miette`] can render
/// the offending location:
///
/// ```text
/// Error: treeconf::decode::parse
///
///   × TOML parse error
///    ╭─[<payload>:2:8]
///  1 │ [db]
///  2 │ port = = 1
///    ·        ┬
///    ·        ╰── invalid string
///    ╰────
///   help: check for missing quotes, invalid values, or syntax errors
/// ```
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum DecodeError {
    /// Payload is not valid UTF-8
    #[error("{format} payload is not valid UTF-8")]
    #[diagnostic(
        code(treeconf::decode::not_utf8),
        help("text formats must be UTF-8 encoded")
    )]
    NotUtf8 {
        /// Format name
        format: &'static str,

        /// The underlying conversion error
        #[source]
        source: std::str::Utf8Error,
    },

    /// Parse error with source location
    #[error("{format} parse error")]
    #[diagnostic(code(treeconf::decode::parse))]
    Parse {
        /// Format name (JSON, TOML, YAML)
        format: &'static str,

        /// The payload for display
        #[source_code]
        src: NamedSource<String>,

        /// The location of the error
        #[label("{message}")]
        span: SourceSpan,

        /// Description of what went wrong
        message: String,

        /// Suggestion for how to fix
        #[help]
        help: String,
    },

    /// Parse error without source location (fallback)
    #[error("{format} parse error: {message}")]
    #[diagnostic(code(treeconf::decode::parse))]
    ParseNoSpan {
        /// Format name
        format: &'static str,

        /// Error message
        message: String,

        /// Suggestion for how to fix
        #[help]
        help: String,
    },

    /// Payload decoded, but its root is not a mapping
    #[error("{format} payload must be a mapping at the top level, found {found}")]
    #[diagnostic(
        code(treeconf::decode::not_a_mapping),
        help("wrap the values in an object/table so every value has a key")
    )]
    NotAMapping {
        /// Format name
        format: &'static str,

        /// Type found at the root
        found: &'static str,
    },

    /// Error raised by a user-supplied decoder
    #[error("{message}")]
    #[diagnostic(code(treeconf::decode::custom))]
    Custom {
        /// Error message
        message: String,
    },
}

impl DecodeError {
    /// Creates an error for a custom [`Decoder`](super::Decoder).
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}
