//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$WEEKBOARD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/weekboard/config.toml`
//! 3. `~/.weekboard/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing so that an out-of-range value
//! is reported at load time rather than when the first drag happens.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Largest accepted phase history length.
pub const MAX_HISTORY_LIMIT: usize = 4096;

/// Largest accepted commit timeout (one hour).
pub const MAX_COMMIT_TIMEOUT_MS: u64 = 60 * 60 * 1000;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// [commit]
/// timeout_ms = 30000
///
/// [drag]
/// history_limit = 32
/// announce_unchanged = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Commit behavior
    pub commit: Option<CommitConfig>,

    /// Drag session behavior
    pub drag: Option<DragConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(commit) = &self.commit {
            commit.validate()?;
        }
        if let Some(drag) = &self.drag {
            drag.validate()?;
        }
        Ok(())
    }
}

/// Commit settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CommitConfig {
    /// Milliseconds to wait for the host before rolling back.
    /// `0` waits forever.
    pub timeout_ms: Option<u64>,
}

impl CommitConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ms) = self.timeout_ms {
            if ms > MAX_COMMIT_TIMEOUT_MS {
                return Err(ConfigError::InvalidValue(format!(
                    "commit.timeout_ms must be at most {}, got {}",
                    MAX_COMMIT_TIMEOUT_MS, ms
                )));
            }
        }
        Ok(())
    }
}

/// Drag session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DragConfig {
    /// Number of phase transitions remembered for inspection.
    pub history_limit: Option<usize>,

    /// Announce drops that leave the card where it was.
    pub announce_unchanged: Option<bool>,
}

impl DragConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(limit) = self.history_limit {
            if limit == 0 || limit > MAX_HISTORY_LIMIT {
                return Err(ConfigError::InvalidValue(format!(
                    "drag.history_limit must be between 1 and {}, got {}",
                    MAX_HISTORY_LIMIT, limit
                )));
            }
        }
        Ok(())
    }
}
