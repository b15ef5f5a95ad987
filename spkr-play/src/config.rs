//! spkr-play configuration
//!
//! Settings resolve per field, highest priority first: CLI flag (clap, which
//! also covers the `SPKR_*` environment via `env =` attributes), then the
//! TOML config file, then compiled defaults.

use spkr_common::config::TomlConfig;
use std::time::Duration;

/// Default server event stream URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8081/events";

/// Default gap before first/next playback, in milliseconds
pub const DEFAULT_DELAY_MS: u64 = 1500;

/// Default external player command
pub fn default_player_command() -> Vec<String> {
    ["ffplay", "-nodisp", "-autoexit", "-loglevel", "error"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Per-run overrides gathered from CLI flags and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub delay_ms: Option<u64>,
    /// Player command as a single whitespace-separated string
    pub player: Option<String>,
}

/// Resolved playback client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server event stream URL
    pub server_url: String,

    /// Gap before first/next playback
    pub delay: Duration,

    /// External player command (argv vector, clip file path appended)
    pub player_command: Vec<String>,
}

impl Config {
    /// Merge overrides, file settings, and compiled defaults
    pub fn resolve(overrides: Overrides, file: TomlConfig) -> Self {
        let server_url = overrides
            .server_url
            .or(file.server_url)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let delay_ms = overrides
            .delay_ms
            .or(file.delay_ms)
            .unwrap_or(DEFAULT_DELAY_MS);

        let player_command = overrides
            .player
            .map(|p| p.split_whitespace().map(|s| s.to_string()).collect())
            .or(file.player_command)
            .filter(|argv: &Vec<String>| !argv.is_empty())
            .unwrap_or_else(default_player_command);

        Self {
            server_url,
            delay: spkr_common::time::millis_to_duration(delay_ms),
            player_command,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::resolve(Overrides::default(), TomlConfig::default())
    }
}
