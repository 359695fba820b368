//! Callback registry.

use std::collections::HashMap;

use super::types::{ChangeCallback, ChangeSet};

/// Registered change listeners.
///
/// Global callbacks see every non-empty generation. Watchers are keyed by
/// prefix; all callbacks under one prefix run in registration order.
#[derive(Default)]
pub(crate) struct Registry {
    global: Vec<ChangeCallback>,
    watchers: HashMap<String, Vec<ChangeCallback>>,
}

impl Registry {
    pub fn on_change(&mut self, callback: ChangeCallback) {
        self.global.push(callback);
    }

    pub fn watch(&mut self, prefix: impl Into<String>, callback: ChangeCallback) {
        self.watchers.entry(prefix.into()).or_default().push(callback);
    }

    /// Global callbacks, cloned so they can run outside any lock.
    pub fn global(&self) -> Vec<ChangeCallback> {
        self.global.clone()
    }

    /// Every callback that must run for `changes`.
    ///
    /// Global callbacks come first when anything changed, followed by each
    /// watcher whose prefix matches at least one changed key. Each watcher
    /// runs at most once per generation no matter how many keys match.
    pub fn affected(&self, changes: &ChangeSet) -> Vec<ChangeCallback> {
        if changes.is_empty() {
            return Vec::new();
        }

        let mut callbacks = self.global.clone();
        for (prefix, listeners) in &self.watchers {
            if changes.any_with_prefix(prefix) {
                callbacks.extend(listeners.iter().cloned());
            }
        }
        callbacks
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.watchers.values().map(Vec::len).sum::<usize>()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("global", &self.global.len())
            .field("watchers", &self.watchers.keys().collect::<Vec<_>>())
            .finish()
    }
}
