//! Configuration file loading
//!
//! spkr reads an optional TOML file from the platform config directory
//! (`<config>/spkr/config.toml`). A missing or malformed file never aborts
//! startup: it degrades to compiled defaults with a logged warning, and every
//! field can still be overridden per-run via CLI flags or `SPKR_*` environment
//! variables (resolved by the consuming binary).

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Optional settings parsed from `config.toml`
///
/// Unset fields fall through to the next source in the resolution order.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Server event stream URL
    pub server_url: Option<String>,

    /// Gap before first/next playback, in milliseconds
    pub delay_ms: Option<u64>,

    /// External player command (argv vector, clip file path appended)
    pub player_command: Option<Vec<String>>,

    /// Default log filter (overridden by RUST_LOG)
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Default config file location for the platform
    ///
    /// `~/.config/spkr/config.toml` on Linux, the equivalent config dir
    /// elsewhere. None when the platform config directory cannot be
    /// determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("spkr").join("config.toml"))
    }

    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the default config file, degrading to defaults on any failure
    ///
    /// Missing file is the normal case and logs at debug; a file that exists
    /// but fails to read or parse logs a warning and is otherwise ignored.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            debug!("No platform config directory; using compiled defaults");
            return Self::default();
        };

        if !path.exists() {
            debug!("No config file at {}; using compiled defaults", path.display());
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }
}
