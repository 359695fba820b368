//! Typed getters and their zero-value fallbacks.

#![allow(clippy::pedantic)]

use std::collections::HashMap;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use treeconf::{ConfigValue, Configuration, Format};

fn loaded(json: &str) -> Configuration {
    let config = Configuration::new();
    config.load(json.as_bytes(), &Format::Json).unwrap();
    config
}

#[test]
fn test_scalars() {
    let config = loaded(
        r#"{
            "name": "svc",
            "debug": "true",
            "workers": 8,
            "ratio": 0.25,
            "big": 9000000000,
            "port": "8080"
        }"#,
    );

    assert_eq!(config.get_string("name"), "svc");
    assert!(config.get_bool("debug"));
    assert_eq!(config.get_int("workers"), 8);
    assert_eq!(config.get_int64("big"), 9_000_000_000);
    assert!((config.get_float64("ratio") - 0.25).abs() < f64::EPSILON);
    assert_eq!(config.get_int("port"), 8080);
    assert_eq!(config.get_string("workers"), "8");
}

#[test]
fn test_missing_and_mismatched_fall_back_to_zero() {
    let config = loaded(r#"{"name": "svc", "nested": {"a": 1}}"#);

    assert_eq!(config.get_string("missing"), "");
    assert!(!config.get_bool("name"));
    assert_eq!(config.get_int("name"), 0);
    assert_eq!(config.get_int64("nested"), 0);
    assert_eq!(config.get_float64("missing"), 0.0);
    assert_eq!(config.get_duration("name"), Duration::ZERO);
    assert_eq!(config.get_time("missing"), Utc.timestamp_opt(0, 0).unwrap());
    assert!(config.get_string_slice("missing").is_empty());
    assert!(config.get_slice("name").is_empty());
    assert!(config.get_string_map("name").is_empty());
    assert!(config.get_slice_string_map("nested").is_empty());
}

#[test]
fn test_int_overflow_falls_back_to_zero() {
    let config = loaded(r#"{"big": 9000000000}"#);

    assert_eq!(config.get_int("big"), 0);
}

#[test]
fn test_get_distinguishes_null() {
    let config = loaded(r#"{"present": 0, "empty": null}"#);

    assert_eq!(config.get("present"), Some(ConfigValue::from(0)));
    assert_eq!(config.get("empty"), None);
    assert!(config.contains("present"));
    assert!(!config.contains("empty"));
}

#[test]
fn test_durations() {
    let config = loaded(r#"{"timeout": "1m30s", "nanos": 1500, "tick": "250ms"}"#);

    assert_eq!(config.get_duration("timeout"), Duration::from_secs(90));
    assert_eq!(config.get_duration("nanos"), Duration::from_nanos(1500));
    assert_eq!(config.get_duration("tick"), Duration::from_millis(250));
}

#[test]
fn test_times() {
    let config = loaded(
        r#"{"rfc": "2024-03-01T12:00:00Z", "date": "2024-03-01", "unix": 1709294400}"#,
    );
    let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    assert_eq!(config.get_time("rfc"), noon);
    assert_eq!(config.get_time("unix"), noon);
    assert_eq!(
        config.get_time("date"),
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_string_slices() {
    let config = loaded(r#"{"list": ["a", 1, true], "words": "a b  c"}"#);

    assert_eq!(config.get_string_slice("list"), vec!["a", "1", "true"]);
    assert_eq!(config.get_string_slice("words"), vec!["a", "b", "c"]);
    assert_eq!(config.get_slice("list").len(), 3);
}

#[test]
fn test_maps() {
    let config = loaded(
        r#"{
            "labels": {"env": "prod", "tier": 2},
            "groups": {"admins": ["ann", "bob"], "owner": "cy"},
            "routes": [{"path": "/a"}, {"path": "/b"}]
        }"#,
    );

    let labels = config.get_string_map_string("labels");
    assert_eq!(labels["env"], "prod");
    assert_eq!(labels["tier"], "2");

    let groups = config.get_string_map_string_slice("groups");
    assert_eq!(groups["admins"], vec!["ann", "bob"]);
    assert_eq!(groups["owner"], vec!["cy"]);

    let routes = config.get_slice_string_map("routes");
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[1]["path"], ConfigValue::from("/b"));

    assert_eq!(config.get_string_map("labels").len(), 2);
}

#[test]
fn test_json_object_string_decodes_as_map() {
    let config = Configuration::new();
    config.set("inline", r#"{"a": "1"}"#);

    let expected: HashMap<String, String> = HashMap::from([("a".to_string(), "1".to_string())]);
    assert_eq!(config.get_string_map_string("inline"), expected);
}

#[test]
fn test_set_then_read_nested() {
    let config = Configuration::new();
    config.set("a.b.c", "deep");
    config.set("a.b.d", vec!["x", "y"]);

    assert_eq!(config.get_string("a.b.c"), "deep");
    assert_eq!(config.get_string_slice("a.b.d"), vec!["x", "y"]);
    assert_eq!(config.get_string_map("a.b").len(), 2);
}

#[test]
fn test_concurrent_readers_and_writers() {
    let config = loaded(r#"{"counter": 0}"#);

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let config = config.clone();
            scope.spawn(move || {
                for i in 0..200 {
                    config.set(&format!("w{worker}.n"), i);
                    let _ = config.get_int("counter");
                    let _ = config.get_int(&format!("w{worker}.n"));
                }
            });
        }
    });

    for worker in 0..4 {
        assert_eq!(config.get_int(&format!("w{worker}.n")), 199);
    }
}
