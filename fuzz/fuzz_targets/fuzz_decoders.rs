#![no_main]

use libfuzzer_sys::fuzz_target;
use treeconf::{Configuration, Decoder, Format};

fuzz_target!(|data: &[u8]| {
    // === Every decoder returns Result, never panics ===
    for format in [Format::Json, Format::Toml, Format::Yaml] {
        let _ = format.decode(data);
    }

    // === A failed load leaves the store untouched ===
    let config = Configuration::new();
    config.load(br#"{"guard": 1}"#, &Format::Json).unwrap();

    for format in [Format::Json, Format::Toml, Format::Yaml] {
        if config.load(data, &format).is_err() {
            assert_eq!(config.raw_config(), br#"{"guard": 1}"#.to_vec());
        }
    }

    // === Flattening whatever got merged never panics ===
    for key in config.all_keys() {
        let _ = config.get(&key);
    }
});
