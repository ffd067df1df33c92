//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;
use std::time::Duration;

use crate::grid::PopulateFilter;
use crate::log::LogLevel;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub dataset: DatasetSettings,
    pub database: DatabaseSettings,
    pub import: ImportSettings,
    pub retry: RetrySettings,
    pub grid: GridSettings,
    pub logging: LoggingSettings,
}

/// `[dataset]`: where airports come from and which are cached.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSettings {
    /// Delimited airport dataset.
    pub airports_file: PathBuf,
    /// Column delimiter.
    pub delimiter: char,
    /// Leave `small_airport` rows out of the distance cache.
    pub skip_small_airports: bool,
}

/// `[database]`: the SQLite store.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSettings {
    /// SQLite database file.
    pub path: PathBuf,
    /// SQL script run instead of the built-in schema.
    pub schema_script: Option<PathBuf>,
    /// Log the text of every query at debug level.
    pub debug_queries: bool,
}

/// `[import]`: pipeline behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    /// Records per bulk upsert.
    pub batch_size: usize,
    /// Run the validation and repair pass after the initial import.
    pub validate: bool,
    /// Worker threads for pair enumeration. 1 runs sequentially.
    pub workers: usize,
}

/// `[retry]`: store operation retries.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    /// Attempts per operation, including the first.
    pub max_attempts: u32,
    /// Fixed pause between attempts in milliseconds.
    pub delay_ms: u64,
}

impl RetrySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// `[grid]`: proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    /// Default search radius in kilometres.
    pub radius_km: f64,
    pub include_closed: bool,
    pub include_small: bool,
    pub include_medium: bool,
}

impl GridSettings {
    /// Classification filter for populating the grid.
    pub fn filter(&self) -> PopulateFilter {
        PopulateFilter {
            include_closed: self.include_closed,
            include_small: self.include_small,
            include_medium: self.include_medium,
        }
    }
}

/// `[logging]`: log file location and default level.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
    /// Default level; `RUST_LOG` overrides it.
    pub level: LogLevel,
}
