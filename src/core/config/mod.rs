//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Builder calls / CLI flags (not handled here)
//!
//! # Config Locations
//!
//! An explicit path (`--config`) wins. Otherwise searched in order:
//! 1. `$WEEKBOARD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/weekboard/config.toml`
//! 3. `~/.weekboard/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use weekboard::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("commit timeout: {:?}", config.commit_timeout());
//! println!("history: {}", config.history_limit());
//! ```

pub mod schema;

pub use schema::{CommitConfig, ConfigFile, DragConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default commit timeout.
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of remembered phase transitions.
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration.
///
/// Accessor methods apply defaults for anything the file leaves out.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: ConfigFile,
    /// Path the file was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// With `explicit` set, that file must exist. Otherwise the standard
    /// locations are searched and a missing file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated, or if an explicit path does not exist.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from(path);
        }

        match Self::search() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Config {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file in the standard locations.
    fn search() -> Option<PathBuf> {
        // 1. Check $WEEKBOARD_CONFIG
        if let Ok(path) = std::env::var("WEEKBOARD_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/weekboard/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("weekboard/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.weekboard/config.toml
        dirs::home_dir()
            .map(|home| home.join(".weekboard/config.toml"))
            .filter(|path| path.exists())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// How long to wait for the host before treating a commit as failed.
    ///
    /// Defaults to 30 seconds. `None` means wait forever (`timeout_ms = 0`).
    pub fn commit_timeout(&self) -> Option<Duration> {
        match self.file.commit.as_ref().and_then(|c| c.timeout_ms) {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => Some(DEFAULT_COMMIT_TIMEOUT),
        }
    }

    /// Number of phase transitions the drag controller remembers.
    ///
    /// Defaults to 32.
    pub fn history_limit(&self) -> usize {
        self.file
            .drag
            .as_ref()
            .and_then(|d| d.history_limit)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    /// Whether a drop that changes nothing is announced.
    ///
    /// Defaults to `true`.
    pub fn announce_unchanged(&self) -> bool {
        self.file
            .drag
            .as_ref()
            .and_then(|d| d.announce_unchanged)
            .unwrap_or(true)
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Build a config from already-parsed settings.
    pub fn from_file(file: ConfigFile) -> Result<Config, ConfigError> {
        file.validate()?;
        Ok(Config { file, path: None })
    }
}
