//! Process configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve the catalog database path and logging settings.
//! - Keep environment variable names in one place.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - Resolution never fails; invalid log levels are rejected later by
//!   `init_logging`.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "MEALMAX_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "MEALMAX_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "MEALMAX_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "mealmax.sqlite3";

/// Resolved settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file holding the `meals` table.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rolling log file directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}
