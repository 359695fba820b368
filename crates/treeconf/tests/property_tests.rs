//! Property-based tests for tree and store invariants.
//!
//! These tests verify that critical invariants hold for all possible inputs,
//! not just hand-picked test cases.

#![allow(clippy::pedantic)]

use proptest::prelude::*;
use treeconf::{ConfigValue, Configuration, Map, tree};

// ============================================================================
// Strategies
// ============================================================================

fn key() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

fn scalar() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        any::<bool>().prop_map(ConfigValue::Boolean),
        any::<i64>().prop_map(ConfigValue::Integer),
        (-1.0e9..1.0e9f64).prop_map(ConfigValue::Float),
        "[ -~]{0,12}".prop_map(ConfigValue::String),
    ]
}

fn value() -> impl Strategy<Value = ConfigValue> {
    scalar().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(ConfigValue::List),
            prop::collection::hash_map(key(), inner, 0..4).prop_map(ConfigValue::Map),
        ]
    })
}

fn tree_map() -> impl Strategy<Value = Map> {
    prop::collection::hash_map(key(), value(), 0..6)
}

fn path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(key(), 1..4)
}

// ============================================================================
// Tree properties
// ============================================================================

mod tree_properties {
    use super::*;

    proptest! {
        /// Merging a tree into itself changes nothing
        #[test]
        fn merge_is_idempotent(base in tree_map()) {
            let mut merged = base.clone();
            tree::merge(&mut merged, base.clone());

            prop_assert_eq!(merged, base);
        }

        /// Merging into an empty tree yields the overlay
        #[test]
        fn merge_into_empty(overlay in tree_map()) {
            let mut merged = Map::new();
            tree::merge(&mut merged, overlay.clone());

            prop_assert_eq!(merged, overlay);
        }

        /// Every overlay leaf wins after a merge
        #[test]
        fn overlay_leaves_win(base in tree_map(), overlay in tree_map()) {
            let mut merged = base;
            tree::merge(&mut merged, overlay.clone());

            let merged_flat = tree::flatten(&merged, ".");
            for (key, leaf) in tree::flatten(&overlay, ".") {
                prop_assert_eq!(merged_flat.get(&key), Some(&leaf), "key {}", key);
            }
        }

        /// Flattened leaves are never mappings
        #[test]
        fn flatten_yields_leaves(root in tree_map()) {
            for leaf in tree::flatten(&root, ".").values() {
                prop_assert!(!leaf.is_map());
            }
        }

        /// A value inserted at a path reads back from the same path
        #[test]
        fn insert_then_lookup(root in tree_map(), segments in path(), leaf in scalar()) {
            let mut root = root;
            let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

            tree::insert_path(&mut root, &segments, leaf.clone());

            prop_assert_eq!(tree::lookup(&root, &segments), leaf);
        }
    }
}

// ============================================================================
// Store properties
// ============================================================================

mod store_properties {
    use super::*;

    fn load(config: &Configuration, root: &Map) -> treeconf::ChangeSet {
        let payload = serde_json::to_vec(&to_json(&ConfigValue::Map(root.clone()))).unwrap();
        config.load(&payload, &treeconf::Format::Json).unwrap()
    }

    fn to_json(value: &ConfigValue) -> serde_json::Value {
        match value {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Boolean(b) => serde_json::Value::Bool(*b),
            ConfigValue::Integer(n) => serde_json::Value::from(*n),
            ConfigValue::Float(f) => serde_json::Value::from(*f),
            ConfigValue::String(s) => serde_json::Value::from(s.clone()),
            ConfigValue::List(items) => items.iter().map(to_json).collect(),
            ConfigValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
            ),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Reloading an identical payload reports no changes
        #[test]
        fn identical_reload_is_quiet(root in tree_map()) {
            let config = Configuration::new();
            load(&config, &root);

            prop_assert!(load(&config, &root).is_empty());
        }

        /// Reported keys are exactly the leaves whose value moved
        #[test]
        fn reported_keys_differ(base in tree_map(), overlay in tree_map()) {
            let config = Configuration::new();
            load(&config, &base);
            let before = tree::flatten(&config.snapshot(), ".");

            let changed = load(&config, &overlay);
            let after = tree::flatten(&config.snapshot(), ".");

            for key in changed.iter() {
                prop_assert!(before.contains_key(key), "new key {} reported", key);
                prop_assert_ne!(before.get(key), after.get(key));
            }
        }

        /// Typed getters never panic on any key
        #[test]
        fn getters_never_panic(root in tree_map(), segments in path()) {
            let config = Configuration::new();
            load(&config, &root);
            let key = segments.join(".");

            let _ = config.get_string(&key);
            let _ = config.get_bool(&key);
            let _ = config.get_int(&key);
            let _ = config.get_float64(&key);
            let _ = config.get_duration(&key);
            let _ = config.get_time(&key);
            let _ = config.get_string_slice(&key);
            let _ = config.get_string_map_string_slice(&key);
        }
    }
}

// ============================================================================
// Parsing properties
// ============================================================================

mod parsing_properties {
    use std::time::Duration;

    use super::*;
    use treeconf::duration::parse_duration;

    proptest! {
        /// parse_duration never panics on any input
        #[test]
        fn parse_duration_never_panics(s in ".*") {
            let _ = parse_duration(&s);
        }

        /// Whole milliseconds round-trip through the text form
        #[test]
        fn millis_roundtrip(ms in 0u64..10_000_000) {
            prop_assert_eq!(parse_duration(&format!("{ms}ms")), Some(Duration::from_millis(ms)));
        }

        /// Compound units add up
        #[test]
        fn compound_units(h in 0u64..100, m in 0u64..60, s in 0u64..60) {
            let text = format!("{h}h{m}m{s}s");
            prop_assert_eq!(
                parse_duration(&text),
                Some(Duration::from_secs(h * 3600 + m * 60 + s))
            );
        }
    }
}
