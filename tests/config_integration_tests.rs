//! Integration tests for config loading from fixture files.
//!
//! These tests verify that the sample config file has the structure the romdl config reader expects.

use std::fs;
use std::path::Path;

use rom_tools::catalog::{ExclusiveDetector, Preset};

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

fn romdl_section() -> toml::Value {
    let value: toml::Value = toml::from_str(&read_sample_config()).expect("should parse");
    value.get("romdl").expect("should have romdl section").clone()
}

#[test]
fn sample_config_file_exists() {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    assert!(config_path.exists(), "Sample config file should exist");
}

#[test]
fn sample_config_is_valid_toml() {
    let config_content = read_sample_config();
    let result: Result<toml::Value, _> = toml::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid TOML: {:?}", result.err());
}

#[test]
fn romdl_section_has_expected_structure() {
    let romdl = romdl_section();
    for key in [
        "url",
        "preset",
        "region_only",
        "include_demos",
        "exclusives",
        "exclusive_countries",
        "output",
        "extract",
        "delete_archives",
        "include_similar",
        "max_files",
        "dryrun",
        "yes",
        "verbose",
        "log",
    ] {
        assert!(romdl.get(key).is_some(), "romdl section should have {key}");
    }
}

#[test]
fn config_values_have_correct_types() {
    let romdl = romdl_section();

    for key in ["region_only", "include_demos", "exclusives", "extract", "dryrun", "yes", "log"] {
        assert!(romdl.get(key).is_some_and(toml::Value::is_bool), "{key} should be a boolean");
    }
    assert!(romdl.get("max_files").is_some_and(toml::Value::is_integer));
    assert!(romdl.get("url").is_some_and(toml::Value::is_str));
    assert!(romdl.get("exclusive_countries").is_some_and(toml::Value::is_array));
}

#[test]
fn sample_preset_is_known() {
    let romdl = romdl_section();
    let preset = romdl.get("preset").and_then(toml::Value::as_str).expect("preset string");
    assert_eq!(preset.parse::<Preset>().expect("known preset"), Preset::Spanish);
}

#[test]
fn sample_exclusive_countries_are_valid() {
    let romdl = romdl_section();
    let countries: Vec<String> = romdl
        .get("exclusive_countries")
        .and_then(toml::Value::as_array)
        .expect("country array")
        .iter()
        .filter_map(|value| value.as_str().map(ToString::to_string))
        .collect();
    let detector = ExclusiveDetector::new(&countries).expect("valid countries");
    assert_eq!(detector.allowed_countries(), Some(["Japan".to_string(), "Korea".to_string()].as_slice()));
}

#[test]
fn sample_url_is_valid() {
    let romdl = romdl_section();
    let url = romdl.get("url").and_then(toml::Value::as_str).expect("url string");
    assert!(rom_tools::listing::validate_url(url).is_ok());
}
