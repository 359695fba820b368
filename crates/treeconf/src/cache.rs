//! Resolved-key cache and change detection.
//!
//! [`KeyCache`] maps dotted keys to the value they last resolved to. It is
//! filled lazily by lookups and bulk-corrected after every merge, where it
//! also serves as the baseline for detecting which keys changed.
//!
//! Two kinds of entries survive a merge that does not mention them:
//!
//! - lookups that resolved to nothing stay cached as [`ConfigValue::Null`]
//!   until the next merge, which evicts them so they are recomputed;
//! - leaf values whose key vanished from the tree (a mapping replaced by a
//!   scalar, for instance) keep their last known value.
//!
//! A cached scalar whose key now names an interior mapping is evicted, since
//! the key still resolves, just to something else.

use std::collections::{BTreeSet, HashMap, HashSet};

use dashmap::DashMap;

use crate::value::ConfigValue;
use crate::watch::ChangeSet;

/// Concurrent dotted-key cache.
///
/// Safe to read and write from any thread without external locking.
#[derive(Debug, Default)]
pub(crate) struct KeyCache {
    entries: DashMap<String, ConfigValue>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, including a cached `Null`.
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: ConfigValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Overwrites the cache with a fresh flattening and reports what changed.
    ///
    /// A key is reported only when it had a previous entry that differs from
    /// the new value. Keys seen for the first time populate the cache silently.
    pub fn reconcile(&self, flat: &HashMap<String, ConfigValue>, delim: &str) -> ChangeSet {
        let mut changed = BTreeSet::new();

        for (key, value) in flat {
            if let Some(previous) = self.entries.insert(key.clone(), value.clone())
                && previous != *value
            {
                changed.insert(key.clone());
            }
        }

        let interior = interior_keys(flat, delim);

        // Drop negative and subtree entries the flattening did not refresh,
        // and scalars shadowed by a mapping at the same key.
        self.entries.retain(|key, value| {
            flat.contains_key(key)
                || !(value.is_null() || value.is_map() || interior.contains(key.as_str()))
        });

        ChangeSet::from(changed)
    }
}

/// Every proper prefix of a flattened key that ends on a delimiter.
fn interior_keys<'a>(flat: &'a HashMap<String, ConfigValue>, delim: &str) -> HashSet<&'a str> {
    let mut interior = HashSet::new();

    for key in flat.keys() {
        for (at, _) in key.match_indices(delim) {
            interior.insert(&key[..at]);
        }
    }

    interior
}
