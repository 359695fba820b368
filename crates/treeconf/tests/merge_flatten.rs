//! Tree merge and flattening through the public store.

#![allow(clippy::pedantic)]

use std::io::Cursor;

use treeconf::{ConfigValue, Configuration, Error, Format, Map, tree};

fn map(json: &str) -> Map {
    serde_json::from_str(json).unwrap()
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn test_later_loads_override_earlier_ones() {
    let config = Configuration::new();
    config
        .load(br#"{"db": {"host": "a", "port": 1}, "name": "svc"}"#, &Format::Json)
        .unwrap();
    config.load(br#"{"db": {"port": 2}}"#, &Format::Json).unwrap();

    assert_eq!(config.get_string("db.host"), "a");
    assert_eq!(config.get_int("db.port"), 2);
    assert_eq!(config.get_string("name"), "svc");
}

#[test]
fn test_lists_are_replaced_not_concatenated() {
    let config = Configuration::new();
    config.load(br#"{"hosts": ["a", "b"]}"#, &Format::Json).unwrap();
    config.load(br#"{"hosts": ["c"]}"#, &Format::Json).unwrap();

    assert_eq!(config.get_string_slice("hosts"), vec!["c".to_string()]);
}

#[test]
fn test_scalar_replaces_mapping_and_back() {
    let config = Configuration::new();
    config.load(br#"{"a": {"b": 1}}"#, &Format::Json).unwrap();
    config.load(br#"{"a": 5}"#, &Format::Json).unwrap();
    assert_eq!(config.get_int("a"), 5);
    assert_eq!(config.all_keys(), vec!["a".to_string()]);

    // A leaf that left the tree keeps its last known value in the cache.
    assert_eq!(config.get_int("a.b"), 1);

    config.load(br#"{"a": {"c": 2}}"#, &Format::Json).unwrap();
    assert_eq!(config.get_int("a.c"), 2);
    assert_eq!(config.all_keys(), vec!["a.c".to_string()]);
}

#[test]
fn test_empty_mapping_merges_to_nothing() {
    let config = Configuration::new();
    config.load(br#"{"a": 1}"#, &Format::Json).unwrap();
    config.load(b"{}", &Format::Json).unwrap();

    assert_eq!(config.get_int("a"), 1);
}

#[test]
fn test_non_mapping_payload_is_rejected() {
    let config = Configuration::new();
    config.load(br#"{"a": 1}"#, &Format::Json).unwrap();

    let err = config.load(b"[1, 2]", &Format::Json).unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(config.get_int("a"), 1);
}

#[test]
fn test_load_from_reader() {
    let config = Configuration::new();
    config
        .load_from_reader(Cursor::new(br#"{"level": "debug"}"#.to_vec()), &Format::Json)
        .unwrap();

    assert_eq!(config.get_string("level"), "debug");
    assert_eq!(config.raw_config(), br#"{"level": "debug"}"#.to_vec());
}

#[test]
fn test_closure_decoder() {
    let decoder = |content: &[u8]| -> Result<Map, treeconf::DecodeError> {
        let text = String::from_utf8_lossy(content);
        let mut out = Map::new();
        for line in text.lines() {
            if let Some((k, v)) = line.split_once('=') {
                out.insert(k.trim().to_string(), ConfigValue::from(v.trim()));
            }
        }
        Ok(out)
    };

    let config = Configuration::new();
    config.load(b"host = example.com\nport = 80", &decoder).unwrap();

    assert_eq!(config.get_string("host"), "example.com");
    assert_eq!(config.get_int("port"), 80);
}

#[cfg(feature = "toml")]
#[test]
fn test_toml_and_json_layers() {
    let config = Configuration::new();
    config
        .load(b"[server]\nport = 8080\nhost = \"0.0.0.0\"\n", &Format::Toml)
        .unwrap();
    config.load(br#"{"server": {"port": 9090}}"#, &Format::Json).unwrap();

    assert_eq!(config.get_int("server.port"), 9090);
    assert_eq!(config.get_string("server.host"), "0.0.0.0");
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_layer() {
    let config = Configuration::new();
    config.load(b"db:\n  host: localhost\n  port: 5432\n", &Format::Yaml).unwrap();

    assert_eq!(config.get_int("db.port"), 5432);
    assert!(config.load(b"", &Format::Yaml).unwrap().is_empty());
}

// ============================================================================
// Flatten
// ============================================================================

#[test]
fn test_flatten_emits_leaves_only() {
    let flat = tree::flatten(&map(r#"{"a": {"b": {"c": 1}, "e": {}}, "d": [1, 2]}"#), "/");

    let mut keys: Vec<&str> = flat.keys().map(String::as_str).collect();
    keys.sort_unstable();

    assert_eq!(keys, vec!["a/b/c", "d"]);
    assert_eq!(flat["a/b/c"], ConfigValue::from(1));
    assert_eq!(flat["d"], ConfigValue::from(vec![1, 2]));
}

#[test]
fn test_all_keys_lists_only_leaves() {
    let config = Configuration::new();
    config
        .load(br#"{"a": {"b": 1, "c": {"d": true}}, "e": null}"#, &Format::Json)
        .unwrap();

    assert_eq!(
        config.all_keys(),
        vec!["a.b".to_string(), "a.c.d".to_string(), "e".to_string()]
    );
}

#[test]
fn test_sub_is_detached() {
    let config = Configuration::new();
    config
        .load(br#"{"db": {"primary": {"host": "a"}, "port": 1}}"#, &Format::Json)
        .unwrap();

    let db = config.sub("db");
    assert_eq!(db.get_string("primary.host"), "a");
    assert_eq!(db.get_int("port"), 1);

    db.set("port", 2);
    config.set("db.primary.host", "b");

    assert_eq!(config.get_int("db.port"), 1);
    assert_eq!(db.get_string("primary.host"), "a");
}

#[test]
fn test_sub_of_missing_key_is_empty() {
    let config = Configuration::new();

    assert!(config.sub("nope").all_keys().is_empty());
}

#[test]
fn test_snapshot_copies_tree() {
    let config = Configuration::new();
    config.set("a.b", 1);

    let snapshot = config.snapshot();
    config.set("a.b", 2);

    assert_eq!(snapshot["a"].as_map().unwrap()["b"], ConfigValue::from(1));
}
