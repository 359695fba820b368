//! Error types for configuration loading and decoding.
//!
//! This module contains the [`Error`] enum returned by the fallible
//! operations on [`Configuration`](crate::Configuration). Every variant is a
//! [`miette::Diagnostic`]; render one with `miette::Report::from(error)` to
//! get source snippets for syntax errors.
//!
//! # Error Variants
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::Source`] | A provider could not produce its payload |
//! | [`Error::Decode`] | A payload could not be decoded into a mapping |
//! | [`Error::Read`] | Reading from an [`io::Read`](std::io::Read) failed |
//! | [`Error::Spawn`] | The background reload thread could not start |
//! | [`Error::InvalidKey`] | A key passed to `unmarshal_key` resolved to nothing |
//! | [`Error::Unmarshal`] | A value could not be decoded into the target type |
//!
//! Typed getters never fail; they fall back to the target type's default.

use miette::Diagnostic;
use thiserror::Error as ThisError;

use crate::codec::DecodeError;
use crate::de::DeError;
use crate::provider::ProviderError;

/// Errors returned by [`Configuration`](crate::Configuration).
///
/// # Diagnostic Codes
///
/// | Code | Meaning |
/// |------|---------|
/// | `treeconf::source` | Provider read failed |
/// | `treeconf::decode::*` | Payload decode failed (see [`DecodeError`]) |
/// | `treeconf::read` | Reader I/O failed |
/// | `treeconf::spawn` | Reload thread could not start |
/// | `treeconf::invalid_key` | Key not present in the configuration |
/// | `treeconf::unmarshal` | Struct decode failed |
#[derive(Debug, ThisError, Diagnostic)]
pub enum Error {
    /// A provider failed to produce its payload.
    #[error("failed to read from provider '{provider}'")]
    #[diagnostic(code(treeconf::source))]
    Source {
        /// The provider name.
        provider: String,

        /// The underlying provider error.
        #[source]
        #[diagnostic_source]
        source: ProviderError,
    },

    /// A payload could not be decoded.
    ///
    /// Transparent, so miette shows the payload snippet from [`DecodeError`].
    #[error(transparent)]
    #[diagnostic(transparent)]
    Decode(#[from] DecodeError),

    /// Reading the payload from a reader failed.
    #[error("failed to read configuration payload")]
    #[diagnostic(
        code(treeconf::read),
        help("check that the reader is open and yields the whole payload")
    )]
    Read {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The background reload thread could not be started.
    #[error("failed to spawn the reload thread for provider '{provider}'")]
    #[diagnostic(code(treeconf::spawn))]
    Spawn {
        /// The provider name.
        provider: String,

        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The key resolved to nothing.
    #[error("invalid key '{key}', maybe not exist in config")]
    #[diagnostic(
        code(treeconf::invalid_key),
        help("check the key path and the key delimiter; use an empty key to decode the whole tree")
    )]
    InvalidKey {
        /// The key that was requested.
        key: String,
    },

    /// The value under a key could not be decoded into the target type.
    #[error("failed to unmarshal '{key}' at `{path}`: {message}")]
    #[diagnostic(code(treeconf::unmarshal))]
    Unmarshal {
        /// The key that was requested.
        key: String,

        /// Path inside the value where decoding failed (`.` for the root).
        path: String,

        /// Description of what went wrong.
        message: String,

        /// Suggestion for how to fix.
        #[help]
        help: String,
    },
}

impl Error {
    /// Creates an [`Error::Source`] from a provider failure.
    pub fn from_provider(source: ProviderError) -> Self {
        Error::Source {
            provider: source.provider_name().to_string(),
            source,
        }
    }

    /// Creates an [`Error::Unmarshal`] from a path-tracking decode error.
    pub(crate) fn unmarshal(key: impl Into<String>, err: &serde_path_to_error::Error<DeError>) -> Self {
        let path = err.path().to_string();
        let help = if path == "." {
            "check that the value has the shape of the target type".to_string()
        } else {
            format!("check the value at `{path}` or enable weakly typed input")
        };

        Error::Unmarshal {
            key: key.into(),
            path,
            message: err.inner().message().to_string(),
            help,
        }
    }

    /// Returns `true` if the error came from an unknown key.
    #[must_use]
    pub const fn is_invalid_key(&self) -> bool {
        matches!(self, Error::InvalidKey { .. })
    }
}

impl From<ProviderError> for Error {
    fn from(source: ProviderError) -> Self {
        Error::from_provider(source)
    }
}

/// Result alias for configuration operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
