//! Unit tests for configuration file loading and graceful degradation
//!
//! Missing or malformed config files must never cause termination; unset
//! fields must stay None so later resolution stages can fill them in.

use spkr_common::config::TomlConfig;
use std::io::Write;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
server_url = "http://media-host:8081/events"
delay_ms = 2500
player_command = ["mpv", "--no-video"]
log_level = "debug"
"#,
    );

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(
        config.server_url.as_deref(),
        Some("http://media-host:8081/events")
    );
    assert_eq!(config.delay_ms, Some(2500));
    assert_eq!(
        config.player_command,
        Some(vec!["mpv".to_string(), "--no-video".to_string()])
    );
    assert_eq!(config.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_load_partial_config_leaves_rest_unset() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "delay_ms = 500\n");

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.delay_ms, Some(500));
    assert!(config.server_url.is_none());
    assert!(config.player_command.is_none());
    assert!(config.log_level.is_none());
}

#[test]
fn test_load_empty_config_is_all_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    assert!(TomlConfig::load(&path).is_err());
}

#[test]
fn test_load_malformed_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "delay_ms = \"not a number\"");

    assert!(TomlConfig::load(&path).is_err());
}

#[test]
fn test_unknown_keys_are_ignored() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "delay_ms = 100\nfuture_option = true\n");

    // Older binaries must tolerate config files written for newer ones
    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.delay_ms, Some(100));
}
