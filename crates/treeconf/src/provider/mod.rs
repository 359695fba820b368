//! Data sources for live configuration.
//!
//! A [`Provider`] supplies raw payload bytes and a stream of change signals.
//! [`Configuration::load_from_data_source`](crate::Configuration::load_from_data_source)
//! reads it once, then re-reads and re-merges it every time the stream
//! yields, until the stream ends.
//!
//! # Built-in Providers
//!
//! - [`MemoryProvider`] - Payload held in memory, updated by the caller
//! - [`FileProvider`] - A file on disk, signalled by filesystem events
//!   (requires the `watch` feature)
//!
//! # Custom Providers
//!
//! ```rust
//! use crossbeam_channel::{Receiver, bounded};
//! use treeconf::{Provider, ProviderError};
//!
//! struct Fixed {
//!     changes: Receiver<()>,
//! }
//!
//! impl Provider for Fixed {
//!     fn name(&self) -> &str {
//!         "fixed"
//!     }
//!
//!     fn read(&self) -> Result<Vec<u8>, ProviderError> {
//!         Ok(br#"{"port": 8080}"#.to_vec())
//!     }
//!
//!     fn changes(&self) -> Receiver<()> {
//!         self.changes.clone()
//!     }
//! }
//!
//! // A stream whose sender is already gone never signals.
//! let (_, changes) = bounded(0);
//! let provider = Fixed { changes };
//! assert!(provider.changes().recv().is_err());
//! ```

#[cfg(feature = "watch")]
mod file;
mod memory;

#[cfg(feature = "watch")]
pub use file::FileProvider;
pub use memory::MemoryProvider;

use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use miette::Diagnostic;
use thiserror::Error as ThisError;

// ============================================================================
// Provider Errors
// ============================================================================

/// Errors that can occur while reading from a provider.
#[derive(Debug, ThisError, Diagnostic)]
pub enum ProviderError {
    /// Provider connection or authentication error.
    #[error("provider '{provider}' connection error: {message}")]
    #[diagnostic(
        code(treeconf::provider::connection),
        help("check provider configuration and connectivity")
    )]
    Connection {
        /// The provider name.
        provider: String,
        /// The error message.
        message: String,
        /// The underlying error source.
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Reading a file failed.
    #[error("provider '{provider}' failed to read {}", path.display())]
    #[diagnostic(
        code(treeconf::provider::io),
        help("check that the file exists and is readable")
    )]
    Io {
        /// The provider name.
        provider: String,
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Provider is not available.
    #[error("provider '{provider}' is not available: {message}")]
    #[diagnostic(
        code(treeconf::provider::unavailable),
        help("ensure the provider is properly configured and accessible")
    )]
    Unavailable {
        /// The provider name.
        provider: String,
        /// The error message.
        message: String,
    },

    /// Generic provider error.
    #[error("provider '{provider}' error: {message}")]
    #[diagnostic(code(treeconf::provider::error))]
    Other {
        /// The provider name.
        provider: String,
        /// The error message.
        message: String,
        /// The underlying error source.
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl ProviderError {
    /// Returns the provider name from the error.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        match self {
            ProviderError::Connection { provider, .. }
            | ProviderError::Io { provider, .. }
            | ProviderError::Unavailable { provider, .. }
            | ProviderError::Other { provider, .. } => provider,
        }
    }

    /// Creates a connection error.
    pub fn connection(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Connection {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a connection error with source.
    pub fn connection_with_source(
        provider: impl Into<String>,
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        ProviderError::Connection {
            provider: provider.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a generic error.
    pub fn other(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Other {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// A source of raw configuration payloads and change signals.
///
/// # Change Stream
///
/// [`changes`](Provider::changes) returns the receiving end of a signal
/// channel. Each `()` received means "the payload may have changed, read it
/// again". The stream ends when every sender is dropped, which is the only
/// way to stop a reload loop driven by this provider.
///
/// The stream is a single queue: when several receivers are handed out,
/// each signal is delivered to one of them.
pub trait Provider: Send + Sync {
    /// Returns the provider's name for logs and error messages.
    fn name(&self) -> &str;

    /// Reads the current payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be fetched.
    fn read(&self) -> Result<Vec<u8>, ProviderError>;

    /// Subscribes to change signals.
    fn changes(&self) -> Receiver<()>;
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self) -> Result<Vec<u8>, ProviderError> {
        (**self).read()
    }

    fn changes(&self) -> Receiver<()> {
        (**self).changes()
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self) -> Result<Vec<u8>, ProviderError> {
        (**self).read()
    }

    fn changes(&self) -> Receiver<()> {
        (**self).changes()
    }
}

// ============================================================================
// Tests
// ============================================================================
