//! Configuration loading from files and RATEMON_* environment variables
//!
//! Tests that touch the process environment run serially.

use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;
use trigger_rate_monitor::config::AppConfig;
use trigger_rate_monitor::errors::AppError;
use trigger_rate_monitor::types::InputNameResolver;

const ENV_KEYS: [&str; 4] = [
    "RATEMON_TIMING__ORBITS_PER_TIME_FRAME",
    "RATEMON_INPUTS__REFERENCE_INPUT",
    "RATEMON_INPUTS__NAMES",
    "RATEMON_PUBLISHING__CYCLE_SIZE",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("monitor.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
#[serial]
fn test_file_values_override_defaults() -> anyhow::Result<()> {
    clear_env();
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[timing]
orbits_per_time_frame = 32

[inputs]
reference_input = "MT0C"
"#,
    );

    let config = AppConfig::load_from(Some(&path))?;
    assert_eq!(config.timing.orbits_per_time_frame, 32);
    assert_eq!(config.inputs.reference_input, "MT0C");
    assert_eq!(config.publishing.cycle_size, 10);
    assert_eq!(config.timing.orbit_length_ms, AppConfig::default().timing.orbit_length_ms);
    Ok(())
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[timing]\norbits_per_time_frame = 32\n");

    env::set_var("RATEMON_TIMING__ORBITS_PER_TIME_FRAME", "64");
    env::set_var("RATEMON_INPUTS__REFERENCE_INPUT", "B");
    env::set_var("RATEMON_INPUTS__NAMES", "A,B,C");
    let result = AppConfig::load_from(Some(&path));
    clear_env();

    let config = result.unwrap();
    assert_eq!(config.timing.orbits_per_time_frame, 64);
    assert_eq!(config.inputs.names, vec!["A", "B", "C"]);

    let table = config.input_table().unwrap();
    assert_eq!(table.resolve_input_index(&config.inputs.reference_input), Some(1));
    assert_eq!(table.name_of(3), Some("MTSC"));
}

#[test]
#[serial]
fn test_invalid_environment_value_is_config_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    env::set_var("RATEMON_PUBLISHING__CYCLE_SIZE", "0");
    let result = AppConfig::load_from(Some(&path));
    clear_env();

    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
#[serial]
fn test_missing_explicit_file_is_config_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(matches!(
        AppConfig::load_from(Some(&missing)),
        Err(AppError::Config(_))
    ));
}
