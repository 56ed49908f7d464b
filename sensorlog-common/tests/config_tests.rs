//! Unit tests for settings loading
//!
//! Covers compiled defaults, partial TOML overlays and the validation that
//! guards SQL identifiers and sensor bounds.

use sensorlog_common::config::{SettingsFile, DEFAULT_BIND_ADDR, DEFAULT_TABLE};
use sensorlog_common::{Error, SensorKind, Settings};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults() {
    let settings = Settings::default();

    assert_eq!(settings.database_path, PathBuf::from("data.sqlite3"));
    assert_eq!(settings.table, DEFAULT_TABLE);
    assert_eq!(settings.sensor, SensorKind::Random);
    assert_eq!(settings.sensor_max, 100.0);
    assert_eq!(settings.sensor_delay, Duration::from_secs(2));
    assert_eq!(settings.logger, "sensorlog");
    assert_eq!(settings.bind_addr, DEFAULT_BIND_ADDR);
    assert!(settings.static_dir.is_none());
    assert!(settings.validate().is_ok());
}

#[test]
fn test_partial_toml_overrides_only_given_fields() {
    let file = SettingsFile::from_toml_str(
        r#"
        database_table = "Greenhouse"
        sensor_delay = 0.25
        "#,
    )
    .unwrap();

    let settings = Settings::default().merge_file(file).unwrap();

    assert_eq!(settings.table, "Greenhouse");
    assert_eq!(settings.sensor_delay, Duration::from_millis(250));
    // Untouched fields keep their defaults
    assert_eq!(settings.database_path, PathBuf::from("data.sqlite3"));
    assert_eq!(settings.sensor, SensorKind::Random);
}

#[test]
fn test_toml_sensor_none_disables_live_feed() {
    let file = SettingsFile::from_toml_str(r#"sensor = "none""#).unwrap();
    let settings = Settings::default().merge_file(file).unwrap();
    assert_eq!(settings.sensor, SensorKind::None);
}

#[test]
fn test_unknown_toml_key_rejected() {
    let result = SettingsFile::from_toml_str(r#"sensor_dleay = 3"#);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_negative_delay_in_file_rejected() {
    let file = SettingsFile::from_toml_str("sensor_delay = -2").unwrap();
    let result = Settings::default().merge_file(file);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        database_url = "/var/lib/sensorlog/readings.db"
        logger = "greenhouse"
        bind = "0.0.0.0:9000"
        "#,
    )
    .unwrap();

    let file = SettingsFile::load(&path).unwrap();
    let settings = Settings::default().merge_file(file).unwrap();

    assert_eq!(
        settings.database_path,
        PathBuf::from("/var/lib/sensorlog/readings.db")
    );
    assert_eq!(settings.logger, "greenhouse");
    assert_eq!(settings.bind_addr, "0.0.0.0:9000");
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = SettingsFile::load(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_validate_rejects_bad_table_name() {
    let settings = Settings {
        table: "readings; DROP TABLE users".to_string(),
        ..Settings::default()
    };
    assert!(matches!(settings.validate(), Err(Error::Config(_))));
}

#[test]
fn test_validate_rejects_non_positive_sensor_max() {
    let settings = Settings {
        sensor_max: 0.0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());

    // Bound is irrelevant when the live feed is disabled
    let disabled = Settings {
        sensor: SensorKind::None,
        sensor_max: 0.0,
        ..Settings::default()
    };
    assert!(disabled.validate().is_ok());
}
