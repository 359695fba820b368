//! Change detection and notification.
//!
//! Every successful merge produces a [`ChangeSet`]: the dotted keys whose
//! resolved value differs from the value cached before the merge. When the
//! set is non-empty, listeners are notified:
//!
//! - **Global callbacks** registered with
//!   [`Configuration::on_change`](crate::Configuration::on_change) run for
//!   every non-empty change set.
//! - **Prefix watchers** registered with
//!   [`Configuration::watch`](crate::Configuration::watch) run when at least
//!   one changed key starts with their prefix.
//!
//! # Dispatch
//!
//! Callbacks run detached, each on its own thread, after the merge has
//! released the configuration lock. There is no ordering guarantee between
//! callbacks, between generations, or relative to the caller. A panicking
//! callback is logged with `tracing` and otherwise ignored.
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌─────────┐   ┌───────────┐   ┌──────────┐
//! │ load/set │──▶│  merge  │──▶│ flatten │──▶│ reconcile │──▶│ dispatch │
//! └──────────┘   └─────────┘   └─────────┘   │  (cache)  │   │ (detach) │
//!                                            └───────────┘   └──────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::mpsc;
//! use treeconf::{Configuration, Format};
//!
//! let config = Configuration::new();
//! config.load(br#"{"db": {"host": "a"}}"#, &Format::Json).unwrap();
//!
//! let (tx, rx) = mpsc::channel();
//! config.watch("db.", move |change| {
//!     tx.send(change.changed.iter().map(String::from).collect::<Vec<_>>()).ok();
//! });
//!
//! config.load(br#"{"db": {"host": "b"}}"#, &Format::Json).unwrap();
//! assert_eq!(rx.recv().unwrap(), vec!["db.host".to_string()]);
//! ```

mod dispatch;
mod registry;
mod types;

pub use types::{ChangeCallback, ChangeSet, ChangeTrigger, ConfigChange};

pub(crate) use dispatch::{dispatch, invoke};
pub(crate) use registry::Registry;
