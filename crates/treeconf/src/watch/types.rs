//! Core types for change notification.
//!
//! - [`ChangeSet`] - Dotted keys whose value changed in one merge generation
//! - [`ConfigChange`] - The event handed to every callback
//! - [`ChangeTrigger`] - What caused the generation

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::Configuration;

/// Callback invoked with a configuration change event.
pub type ChangeCallback = Arc<dyn Fn(&ConfigChange) + Send + Sync + 'static>;

/// The set of dotted keys whose resolved value changed in one generation.
///
/// Cheap to clone; every callback dispatched for the same generation shares
/// one allocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    keys: Arc<BTreeSet<String>>,
}

impl ChangeSet {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of changed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if `key` changed.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Iterates the changed keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Returns `true` if any changed key starts with `prefix`.
    ///
    /// This is a plain string-prefix test: `"db"` matches `"db.host"` and
    /// also `"dbx.flag"`. Watch a prefix ending in the key delimiter
    /// (`"db."`) to restrict matches to one subtree.
    #[must_use]
    pub fn any_with_prefix(&self, prefix: &str) -> bool {
        self.keys.iter().any(|key| key.starts_with(prefix))
    }
}

impl From<BTreeSet<String>> for ChangeSet {
    fn from(keys: BTreeSet<String>) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }
}

/// A configuration change event.
///
/// Passed to every [`on_change`](Configuration::on_change) and
/// [`watch`](Configuration::watch) callback.
///
/// # Example
///
/// ```ignore
/// config.watch("db", |change: &ConfigChange| {
///     if change.changed.contains("db.host") {
///         reconnect(change.config.get_string("db.host"));
///     }
/// });
/// ```
#[derive(Clone)]
pub struct ConfigChange {
    /// Handle to the configuration that changed.
    pub config: Configuration,

    /// Keys whose value changed (empty for the initial load).
    pub changed: ChangeSet,

    /// What produced this generation.
    pub trigger: ChangeTrigger,

    /// Generation counter after the change was applied.
    pub generation: u64,

    /// When the change was detected.
    pub timestamp: Instant,
}

impl ConfigChange {
    pub(crate) fn new(
        config: Configuration,
        changed: ChangeSet,
        trigger: ChangeTrigger,
        generation: u64,
    ) -> Self {
        Self {
            config,
            changed,
            trigger,
            generation,
            timestamp: Instant::now(),
        }
    }

    /// Create the event for the initial load from a provider.
    pub(crate) fn initial(config: Configuration) -> Self {
        let generation = config.generation();
        Self::new(config, ChangeSet::default(), ChangeTrigger::Initial, generation)
    }

    /// Returns `true` if this is the initial load notification.
    #[must_use]
    pub const fn is_initial(&self) -> bool {
        matches!(self.trigger, ChangeTrigger::Initial)
    }

    /// Returns `true` if any key changed.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

impl fmt::Debug for ConfigChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigChange")
            .field("changed", &self.changed)
            .field("trigger", &self.trigger)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// What produced a merge generation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChangeTrigger {
    /// First successful load from a provider.
    Initial,

    /// A payload passed to [`load`](Configuration::load) or
    /// [`load_from_reader`](Configuration::load_from_reader), or the first
    /// read of [`load_from_data_source`](Configuration::load_from_data_source).
    Load,

    /// A single key assigned with [`set`](Configuration::set).
    Set(String),

    /// A provider signalled new content, named by the provider.
    SourceChanged(String),
}

impl ChangeTrigger {
    /// Returns the provider name if this trigger came from a provider.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::SourceChanged(name) => Some(name),

            _ => None,
        }
    }
}

impl fmt::Display for ChangeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial load"),

            Self::Load => write!(f, "load"),

            Self::Set(key) => write!(f, "set {key}"),

            Self::SourceChanged(provider) => write!(f, "source changed: {provider}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(keys: &[&str]) -> ChangeSet {
        ChangeSet::from(keys.iter().map(|k| (*k).to_string()).collect::<BTreeSet<_>>())
    }

    #[test]
    fn test_prefix_matching_is_textual() {
        let set = changes(&["dbx.flag"]);

        assert!(set.any_with_prefix("db"));
        assert!(!set.any_with_prefix("db."));
        assert!(set.any_with_prefix(""));
    }

    #[test]
    fn test_change_set_accessors() {
        let set = changes(&["b", "a"]);

        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(ChangeSet::default().is_empty());
    }

    #[test]
    fn test_change_trigger_display() {
        assert_eq!(ChangeTrigger::Initial.to_string(), "initial load");
        assert_eq!(ChangeTrigger::Set("a.b".into()).to_string(), "set a.b");

        let trigger = ChangeTrigger::SourceChanged("file".into());
        assert!(trigger.to_string().contains("file"));
        assert_eq!(trigger.provider(), Some("file"));
        assert_eq!(ChangeTrigger::Load.provider(), None);
    }
}
