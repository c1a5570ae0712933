//! Integration tests for configuration loading

use locfix::infra::Config;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[request]
timeout_ms = 15000

[acceptance]
accuracy_threshold_m = 50.0
staleness_bound_ms = 2000

[provider]
event_buffer = 128
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.timeout(), Duration::from_secs(15));
    assert_eq!(config.accuracy_threshold_m(), 50.0);
    assert_eq!(config.staleness_bound(), Duration::from_secs(2));
    assert_eq!(config.event_buffer(), 128);
}

#[test]
fn test_missing_sections_use_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();

    temp_file
        .write_all(b"[request]\ntimeout_ms = 3000\n")
        .unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.timeout_ms(), 3000);
    assert_eq!(config.accuracy_threshold_m(), 100.0);
    assert_eq!(config.staleness_bound_ms(), 5000);
}

#[test]
fn test_invalid_threshold_rejected() {
    let mut temp_file = NamedTempFile::new().unwrap();

    temp_file
        .write_all(b"[acceptance]\naccuracy_threshold_m = -5.0\n")
        .unwrap();
    temp_file.flush().unwrap();

    assert!(Config::from_file(temp_file.path()).is_err());
}

#[test]
fn test_load_resolution_order() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[request]\ntimeout_ms = 4000\n")
        .unwrap();
    temp_file.flush().unwrap();
    let path = temp_file.path().display().to_string();

    // --config argument wins
    let args = vec!["locfix".to_string(), format!("--config={path}")];
    let config = Config::load(&args);
    assert_eq!(config.timeout_ms(), 4000);
    assert_eq!(config.config_file(), path);

    // CONFIG_FILE environment variable is consulted next
    std::env::set_var("CONFIG_FILE", &path);
    let config = Config::load(&["locfix".to_string()]);
    assert_eq!(config.timeout_ms(), 4000);
    std::env::remove_var("CONFIG_FILE");
}

#[test]
fn test_load_from_path_fallback() {
    // Nonexistent file falls back to defaults rather than failing
    let config = Config::load_from_path("/nonexistent/locfix.toml");
    assert_eq!(config.timeout_ms(), 10_000);
    assert_eq!(config.config_file(), "default");
}
