#![no_main]

use libfuzzer_sys::fuzz_target;
use treeconf::ConfigValue;
use treeconf::duration::parse_duration;

fuzz_target!(|data: &str| {
    // === Duration parsing - should never panic ===
    let _ = parse_duration(data);

    // === Conversions from a string scalar - should never panic ===
    let value = ConfigValue::from(data);
    check_conversions(&value);

    // === Conversions from an arbitrary JSON value - should never panic ===
    if let Ok(value) = serde_json::from_str::<ConfigValue>(data) {
        check_conversions(&value);
        let _ = format!("{value:?}");
        assert_eq!(value, value.clone());
    }
});

fn check_conversions(value: &ConfigValue) {
    let _ = value.to_i32();
    let _ = value.to_i64();
    let _ = value.to_u32();
    let _ = value.to_u64();
    let _ = value.to_f64();
    let _ = value.to_bool();
    let _ = value.to_text();
    let _ = value.to_duration();
    let _ = value.to_time();
    let _ = value.to_string_slice();
    let _ = value.to_slice();
    let _ = value.to_string_map();
    let _ = value.to_string_map_string();
    let _ = value.to_string_map_string_slice();
    let _ = value.to_slice_string_map();
    let _ = value.type_name();
}
