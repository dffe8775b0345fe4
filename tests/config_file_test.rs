// Loading mapping configuration from files

use std::io::Write;
use tabmap_wasm::config::ConfigError;
use tabmap_wasm::{DurationMode, MappingConfig, OrnamentDirection, Rational};
use tempfile::Builder;

fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_yaml_file() {
    let file = write_config(
        ".yaml",
        "include_ornamentation: false\nornament_direction: backward\ngrid_unit: [1, 192]\n",
    );
    let config = MappingConfig::load(file.path()).unwrap();
    assert!(!config.include_ornamentation);
    assert_eq!(config.ornament_direction, OrnamentDirection::Backward);
    assert_eq!(config.duration_mode, DurationMode::AsMatched);
    assert_eq!(config.grid_unit, Rational::new(1, 192));
}

#[test]
fn test_load_json_file() {
    let file = write_config(".json", r#"{"durationMode": "completedToBar"}"#);
    let config = MappingConfig::load(file.path()).unwrap();
    assert_eq!(config.duration_mode, DurationMode::CompletedToBar);
    assert!(config.include_ornamentation);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = MappingConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_invalid_grid_unit_in_file() {
    let file = write_config(".yml", "grid_unit: [3, 2]\n");
    assert!(matches!(MappingConfig::load(file.path()).unwrap_err(), ConfigError::Invalid(_)));
}
