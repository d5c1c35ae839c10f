//! Runtime configuration resolved from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `TASKFLOW_DB_PATH` | unset: in-memory store |
//! | `TASKFLOW_LOG_LEVEL` | [`default_log_level`] |
//! | `TASKFLOW_LOG_DIR` | unset: stderr |
//! | `TASKFLOW_MONITOR_INTERVAL_SECS` | `60`, accepted `1..=3600` |

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LogConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TASKFLOW_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKFLOW_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKFLOW_LOG_DIR";
pub const ENV_MONITOR_INTERVAL_SECS: &str = "TASKFLOW_MONITOR_INTERVAL_SECS";

pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(60);
const MONITOR_INTERVAL_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=3600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidLogDir(String),
    InvalidMonitorInterval(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) | Self::InvalidLogDir(message) => {
                write!(f, "{message}")
            }
            Self::InvalidMonitorInterval(value) => write!(
                f,
                "{ENV_MONITOR_INTERVAL_SECS} must be an integer in {}..={}, got `{value}`",
                MONITOR_INTERVAL_RANGE_SECS.start(),
                MONITOR_INTERVAL_RANGE_SECS.end()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Fully resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file; `None` selects the in-memory store.
    pub db_path: Option<PathBuf>,
    pub log: LogConfig,
    pub monitor_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log: LogConfig::default(),
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
        }
    }
}

impl AppConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let level = match read(ENV_LOG_LEVEL) {
            Some(value) => normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };
        let dir = match read(ENV_LOG_DIR) {
            Some(value) => {
                Some(normalize_log_dir(&PathBuf::from(value)).map_err(ConfigError::InvalidLogDir)?)
            }
            None => None,
        };
        let monitor_interval = match read(ENV_MONITOR_INTERVAL_SECS) {
            Some(value) => parse_monitor_interval(&value)?,
            None => DEFAULT_MONITOR_INTERVAL,
        };

        Ok(Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log: LogConfig {
                level: level.to_string(),
                dir,
            },
            monitor_interval,
        })
    }
}

/// Parses a whole number of seconds within the accepted range.
pub fn parse_monitor_interval(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| MONITOR_INTERVAL_RANGE_SECS.contains(secs))
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidMonitorInterval(value.to_string()))
}
