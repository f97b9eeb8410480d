//! Runtime configuration for the roster core.
//!
//! # Responsibility
//! - Resolve database path, logging settings and duplicate-id policy.
//! - Apply `STUDENTMAN_*` environment overrides on top of defaults.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Unknown policy values are rejected instead of silently defaulted.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_DB_PATH: &str = "STUDENTMAN_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "STUDENTMAN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STUDENTMAN_LOG_DIR";
pub const ENV_DUPLICATE_POLICY: &str = "STUDENTMAN_DUPLICATE_POLICY";

const DEFAULT_DB_FILE_NAME: &str = "studentman.sqlite3";

/// How the controller reports an add whose id already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateIdPolicy {
    /// Return a successful "ignored" outcome; the store is left untouched.
    Ignore,
    /// Return `ControllerError::DuplicateId` so the UI can tell the user.
    #[default]
    Reject,
}

impl FromStr for DuplicateIdPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_DUPLICATE_POLICY,
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// SQLite file holding the `student` table.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    pub duplicate_policy: DuplicateIdPolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            duplicate_policy: DuplicateIdPolicy::default(),
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by `STUDENTMAN_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values returned from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(policy) = read(ENV_DUPLICATE_POLICY) {
            config.duplicate_policy = policy.parse()?;
        }
        Ok(config)
    }
}
