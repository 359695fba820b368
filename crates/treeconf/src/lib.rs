//! # treeconf
//!
//! A hierarchical, thread-safe, in-process configuration store.
//!
//! `treeconf` keeps one nested tree of [`ConfigValue`]s. Payloads from any
//! number of sources are deep-merged into it, values are read back through
//! dotted keys such as `"db.host"`, and callbacks are told exactly which keys
//! changed after every merge.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::mpsc;
//! use treeconf::{Configuration, Format};
//!
//! let config = Configuration::new();
//! config.load(br#"{"server": {"port": 8080, "host": "0.0.0.0"}}"#, &Format::Json)?;
//!
//! let (tx, rx) = mpsc::channel();
//! config.watch("server.", move |change| {
//!     let _ = tx.send(change.changed.iter().map(String::from).collect::<Vec<_>>());
//! });
//!
//! config.load(br#"{"server": {"port": 9090}}"#, &Format::Json)?;
//!
//! assert_eq!(config.get_int("server.port"), 9090);
//! assert_eq!(config.get_string("server.host"), "0.0.0.0");
//! assert_eq!(rx.recv().unwrap(), vec!["server.port".to_string()]);
//! # Ok::<(), treeconf::Error>(())
//! ```
//!
//! ## How a Load Works
//!
//! | Stage | Module | What happens |
//! |-------|--------|--------------|
//! | Decode | [`codec`] | Payload bytes become a [`Map`] |
//! | Merge | [`tree`] | The mapping is deep-merged into the tree |
//! | Flatten | [`tree`] | The tree becomes a dotted-key table |
//! | Detect | internal cache | Keys whose cached value differs are collected |
//! | Notify | [`watch`] | Global and prefix callbacks run on their own threads |
//!
//! Values read before a merge are cached, including misses. A key is only
//! reported as changed if it had been cached before and its value differs,
//! so keys seen for the first time are never reported.
//!
//! ## Reading Values
//!
//! Typed getters such as [`Configuration::get_int`] never fail; they return
//! the type's zero value when the key is missing or does not convert.
//! [`Configuration::unmarshal_key`] decodes a subtree into any
//! [`serde::Deserialize`] type with case-insensitive field matching and
//! optional weak typing (see [`DecodeOptions`]).
//!
//! ## Sources
//!
//! [`Configuration::load_from_data_source`] takes a [`Provider`] and keeps
//! re-reading it whenever the provider signals a change:
//!
//! - [`MemoryProvider`] - payload held in memory, updated by hand
//! - `FileProvider` - a file watched through the platform notifier (`watch` feature)
//!
//! Anything else implements [`Provider`] directly.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `toml` | TOML payloads (JSON is always available) | No |
//! | `yaml` | YAML payloads | No |
//! | `file-all` | All payload formats | No |
//! | `watch` | `FileProvider` with filesystem notifications | No |
//! | `full` | Enable all features | No |
//!
//! ## Error Handling
//!
//! Fallible operations return [`Error`], a [`miette::Diagnostic`]. Syntax
//! errors carry the payload and a span:
//!
//! ```rust
//! use treeconf::{Configuration, Format};
//!
//! let config = Configuration::new();
//! if let Err(e) = config.load(b"{\"port\": }", &Format::Json) {
//!     eprintln!("{:?}", miette::Report::from(e));
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Re-export miette so callers can render diagnostics without a direct dependency.
pub use miette;

// ============================================================================
// Core Modules
// ============================================================================

pub mod cast;
pub mod duration;
pub mod tree;
pub mod value;

mod cache;
mod config;

pub use config::{Configuration, ReloadHandle};
pub use value::{ConfigValue, Map};

mod error;
pub use error::{Error, Result};

// ============================================================================
// Decoding
// ============================================================================

pub mod codec;
pub mod de;

pub use codec::{DecodeError, Decoder, Format};
pub use de::DecodeOptions;

// ============================================================================
// Sources and Notifications
// ============================================================================

pub mod provider;
pub mod watch;

#[cfg(feature = "watch")]
pub use provider::FileProvider;
pub use provider::{MemoryProvider, Provider, ProviderError};
pub use watch::{ChangeCallback, ChangeSet, ChangeTrigger, ConfigChange};
