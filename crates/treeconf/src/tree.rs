//! Tree operations: deep merge, path insertion, lookup, and flattening.
//!
//! The configuration tree is a plain [`Map`]. A node counts as nested only
//! when it is a [`ConfigValue::Map`]; everything else, lists included, is a
//! leaf.

use std::collections::HashMap;

use crate::value::{ConfigValue, Map};

/// Deep merges `overlay` into `base`, with `overlay` taking precedence.
///
/// When both sides hold a mapping under the same key the merge recurses.
/// Any other combination (scalars, lists, or a type mismatch) replaces the
/// old value with the new one; lists are never concatenated.
///
/// # Example
///
/// ```rust
/// use treeconf::{ConfigValue, Map, tree};
///
/// let mut base: Map = serde_json::from_str(r#"{"db": {"host": "a", "port": 1}}"#).unwrap();
/// let overlay: Map = serde_json::from_str(r#"{"db": {"port": 2}}"#).unwrap();
///
/// tree::merge(&mut base, overlay);
///
/// let db = base["db"].as_map().unwrap();
/// assert_eq!(db["host"], ConfigValue::from("a"));
/// assert_eq!(db["port"], ConfigValue::from(2));
/// ```
pub fn merge(base: &mut Map, overlay: Map) {
    for (key, incoming) in overlay {
        let ConfigValue::Map(incoming_map) = incoming else {
            base.insert(key, incoming);
            continue;
        };

        if let Some(ConfigValue::Map(existing)) = base.get_mut(&key) {
            merge(existing, incoming_map);
            continue;
        }

        base.insert(key, ConfigValue::Map(incoming_map));
    }
}

/// Assigns `value` at `path`, creating intermediate mappings as needed.
///
/// An intermediate segment that is missing or holds a non-mapping value is
/// replaced with an empty mapping, discarding whatever scalar was there.
/// An empty path is a no-op.
pub fn insert_path(root: &mut Map, path: &[&str], value: ConfigValue) {
    let Some((leaf, parents)) = path.split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        let entry = node
            .entry((*segment).to_string())
            .or_insert_with(|| ConfigValue::Map(Map::new()));

        if !entry.is_map() {
            *entry = ConfigValue::Map(Map::new());
        }

        let ConfigValue::Map(next) = entry else {
            return;
        };
        node = next;
    }

    node.insert((*leaf).to_string(), value);
}

/// Walks `path` and returns the mapping found there.
///
/// Returns `None` when a segment is missing or does not hold a mapping.
#[must_use]
pub fn search<'a>(root: &'a Map, path: &[&str]) -> Option<&'a Map> {
    path.iter()
        .try_fold(root, |node, segment| node.get(*segment)?.as_map())
}

/// Resolves a split key against the tree.
///
/// All but the last segment select a nested mapping; the last segment reads
/// the value under it. Anything unreachable resolves to [`ConfigValue::Null`].
#[must_use]
pub fn lookup(root: &Map, segments: &[&str]) -> ConfigValue {
    let Some((leaf, parents)) = segments.split_last() else {
        return ConfigValue::Null;
    };

    search(root, parents)
        .and_then(|node| node.get(*leaf))
        .cloned()
        .unwrap_or_default()
}

/// Flattens the tree into a dotted-key map of leaf values.
///
/// Segments are joined with `delimiter`; top-level keys carry no leading
/// delimiter. Every reachable leaf appears exactly once. Empty mappings have
/// no leaves and therefore no entries.
///
/// # Example
///
/// ```rust
/// use treeconf::{ConfigValue, Map, tree};
///
/// let root: Map = serde_json::from_str(r#"{"a": {"b": 1, "c": [2]}, "d": true}"#).unwrap();
/// let flat = tree::flatten(&root, ".");
///
/// assert_eq!(flat.len(), 3);
/// assert_eq!(flat["a.b"], ConfigValue::from(1));
/// assert_eq!(flat["d"], ConfigValue::from(true));
/// ```
#[must_use]
pub fn flatten(root: &Map, delimiter: &str) -> HashMap<String, ConfigValue> {
    let mut out = HashMap::new();
    flatten_into("", root, delimiter, &mut out);
    out
}

fn flatten_into(prefix: &str, node: &Map, delimiter: &str, out: &mut HashMap<String, ConfigValue>) {
    for (key, value) in node {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{delimiter}{key}")
        };

        match value {
            ConfigValue::Map(child) => flatten_into(&path, child, delimiter, out),

            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}
