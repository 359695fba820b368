#![no_main]

use std::collections::HashMap;
use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use serde::Deserialize;
use treeconf::{ConfigValue, DecodeOptions, de::from_value};

#[allow(dead_code)]
#[derive(Deserialize)]
struct FuzzConfig {
    #[serde(default)]
    string_field: Option<String>,
    #[serde(default)]
    int_field: Option<i64>,
    #[serde(default)]
    bool_field: Option<bool>,
    #[serde(default)]
    timeout: Option<Duration>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    nested: Option<HashMap<String, String>>,
}

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<ConfigValue>(data) else {
        return;
    };

    // Decoding should return Result, never panic
    for weak in [false, true] {
        let options = DecodeOptions::default().weakly_typed_input(weak);
        let _ = from_value::<FuzzConfig>(value.clone(), &options);
        let _ = from_value::<Vec<u16>>(value.clone(), &options);
        let _ = from_value::<Duration>(value.clone(), &options);
    }
});
