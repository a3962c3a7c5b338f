//! Inventory runtime configuration.
//!
//! # Responsibility
//! - Hold tunables for the list engine timers and logging.
//! - Load them from JSON with per-field defaults.
//!
//! # Invariants
//! - A config returned by [`InventoryConfig::from_json_str`] has passed
//!   [`InventoryConfig::validate`].

use crate::inventory::state::SortBy;
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MIN_UNDO_GRACE_MS: u64 = 500;
const MAX_UNDO_GRACE_MS: u64 = 60_000;
const MAX_SEARCH_DEBOUNCE_MS: u64 = 2_000;
const KNOWN_LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Undo window before a requested delete is committed.
    pub undo_grace_ms: u64,
    /// Quiet period before a typed query is applied.
    pub search_debounce_ms: u64,
    /// Sort mode for freshly mounted lists.
    pub default_sort: SortBy,
    pub log_level: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            undo_grace_ms: 5_000,
            search_debounce_ms: 150,
            default_sort: SortBy::Expiration,
            log_level: default_log_level().to_string(),
        }
    }
}

impl InventoryConfig {
    /// Parses JSON; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_UNDO_GRACE_MS..=MAX_UNDO_GRACE_MS).contains(&self.undo_grace_ms) {
            return Err(ConfigError::Invalid(format!(
                "undo_grace_ms must be between {MIN_UNDO_GRACE_MS} and {MAX_UNDO_GRACE_MS}, got {}",
                self.undo_grace_ms
            )));
        }
        if self.search_debounce_ms > MAX_SEARCH_DEBOUNCE_MS {
            return Err(ConfigError::Invalid(format!(
                "search_debounce_ms must be at most {MAX_SEARCH_DEBOUNCE_MS}, got {}",
                self.search_debounce_ms
            )));
        }
        let level = self.log_level.trim().to_ascii_lowercase();
        if !KNOWN_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unsupported log_level `{}`",
                self.log_level
            )));
        }
        Ok(())
    }
}
