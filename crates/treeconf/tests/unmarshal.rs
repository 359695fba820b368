//! Struct decoding through `unmarshal_key`.

#![allow(clippy::pedantic)]

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use treeconf::{Configuration, DecodeOptions, Error, Format};

fn loaded(json: &str) -> Configuration {
    let config = Configuration::new();
    config.load(json.as_bytes(), &Format::Json).unwrap();
    config
}

#[derive(Debug, Deserialize, PartialEq)]
struct Database {
    host: String,
    port: u16,
    #[serde(default)]
    replicas: Vec<String>,
    #[serde(default)]
    timeout: Duration,
}

#[derive(Debug, Deserialize, PartialEq)]
struct App {
    name: String,
    database: Database,
    #[serde(default)]
    labels: HashMap<String, String>,
}

#[test]
fn test_unmarshal_subtree() {
    let config = loaded(
        r#"{"database": {"host": "db", "port": 5432, "replicas": ["r1"], "timeout": "5s"}}"#,
    );

    let db: Database = config.unmarshal_key("database").unwrap();

    assert_eq!(
        db,
        Database {
            host: "db".into(),
            port: 5432,
            replicas: vec!["r1".into()],
            timeout: Duration::from_secs(5),
        }
    );
}

#[test]
fn test_empty_key_decodes_whole_tree() {
    let config = loaded(
        r#"{"name": "svc", "database": {"host": "db", "port": 1}, "labels": {"team": "core"}}"#,
    );

    let app: App = config.unmarshal_key("").unwrap();

    assert_eq!(app.name, "svc");
    assert_eq!(app.database.port, 1);
    assert_eq!(app.labels["team"], "core");
}

#[test]
fn test_missing_key_is_invalid_key() {
    let config = loaded(r#"{"a": 1}"#);

    let err = config.unmarshal_key::<Database>("database").unwrap_err();

    assert!(err.is_invalid_key());
    assert_eq!(
        err.to_string(),
        "invalid key 'database', maybe not exist in config"
    );
}

#[test]
fn test_null_value_is_invalid_key() {
    let config = loaded(r#"{"database": null}"#);

    assert!(
        config
            .unmarshal_key::<Database>("database")
            .unwrap_err()
            .is_invalid_key()
    );
}

#[test]
fn test_type_mismatch_reports_path() {
    let config = loaded(r#"{"database": {"host": "db", "port": "not-a-port"}}"#);

    let err = config.unmarshal_key::<Database>("database").unwrap_err();

    match err {
        Error::Unmarshal { key, path, .. } => {
            assert_eq!(key, "database");
            assert_eq!(path, "port");
        }
        other => panic!("expected Unmarshal, got {other:?}"),
    }
}

#[test]
fn test_case_insensitive_by_default() {
    let config = loaded(r#"{"database": {"HOST": "db", "Port": 1}}"#);

    let db: Database = config.unmarshal_key("database").unwrap();
    assert_eq!(db.host, "db");

    let exact = DecodeOptions::default().case_insensitive(false);
    assert!(config.unmarshal_key_with::<Database>("database", &exact).is_err());
}

#[test]
fn test_weakly_typed_input() {
    let config = loaded(r#"{"database": {"host": 10, "port": "5432", "replicas": "solo"}}"#);

    assert!(config.unmarshal_key::<Database>("database").is_err());

    let weak = DecodeOptions::default().weakly_typed_input(true);
    let db: Database = config.unmarshal_key_with("database", &weak).unwrap();

    assert_eq!(db.host, "10");
    assert_eq!(db.port, 5432);
    assert_eq!(db.replicas, vec!["solo".to_string()]);
}

#[test]
fn test_instance_decode_options() {
    let config = loaded(r#"{"port": "80"}"#);
    assert_eq!(config.unmarshal_with_expect("port", 0u16), 0);

    config.set_decode_options(DecodeOptions::default().weakly_typed_input(true));

    assert!(config.decode_options().weakly_typed_input);
    assert_eq!(config.unmarshal_with_expect("port", 0u16), 80);
}

#[test]
fn test_unmarshal_with_expect_fallback() {
    let config = loaded(r#"{"database": {"host": "db"}}"#);
    let fallback = Database {
        host: "localhost".into(),
        port: 5432,
        replicas: vec![],
        timeout: Duration::ZERO,
    };

    let db = config.unmarshal_with_expect(
        "database",
        Database {
            host: "localhost".into(),
            port: 5432,
            replicas: vec![],
            timeout: Duration::ZERO,
        },
    );
    assert_eq!(db, fallback);

    let missing = config.unmarshal_with_expect("nope", vec!["x".to_string()]);
    assert_eq!(missing, vec!["x".to_string()]);
}

#[test]
fn test_unmarshal_scalar_and_list() {
    let config = loaded(r#"{"retries": 3, "hosts": ["a", "b"], "interval": 1000000000}"#);

    assert_eq!(config.unmarshal_key::<u8>("retries").unwrap(), 3);
    assert_eq!(
        config.unmarshal_key::<Vec<String>>("hosts").unwrap(),
        vec!["a", "b"]
    );
    assert_eq!(
        config.unmarshal_key::<Duration>("interval").unwrap(),
        Duration::from_secs(1)
    );
}

#[test]
fn test_renamed_and_flattened_fields() {
    #[derive(Deserialize)]
    struct Tls {
        cert: String,
    }

    #[derive(Deserialize)]
    struct Listener {
        #[serde(rename = "listen_addr")]
        addr: String,
        #[serde(flatten)]
        tls: Tls,
    }

    let config = loaded(r#"{"http": {"listen_addr": ":443", "cert": "/etc/cert.pem"}}"#);
    let listener: Listener = config.unmarshal_key("http").unwrap();

    assert_eq!(listener.addr, ":443");
    assert_eq!(listener.tls.cert, "/etc/cert.pem");
}

#[test]
fn test_unmarshal_uses_custom_delimiter() {
    let config = loaded(r#"{"db": {"primary": {"host": "a", "port": 1}}}"#);
    config.set_key_delim("::");

    let db: Database = config.unmarshal_key("db::primary").unwrap();
    assert_eq!(db.host, "a");
}

#[test]
fn test_decode_error_renders_with_miette() {
    let config = Configuration::new();
    let err = config.load(b"{\"port\": }", &Format::Json).unwrap_err();

    let rendered = format!("{:?}", miette::Report::from(err));
    assert!(!rendered.is_empty());
}
