//! Default values for every configuration setting.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::log::LogLevel;

// =============================================================================
// Dataset
// =============================================================================

pub const DEFAULT_AIRPORTS_FILE: &str = "airports.csv";
pub const DEFAULT_SKIP_SMALL_AIRPORTS: bool = true;

// =============================================================================
// Database
// =============================================================================

pub const DEFAULT_DATABASE_FILE: &str = "airdist.db";
pub const DEFAULT_DEBUG_QUERIES: bool = false;

// =============================================================================
// Import
// =============================================================================

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_VALIDATE: bool = true;
pub const DEFAULT_WORKERS: usize = 1;

// =============================================================================
// Retry
// =============================================================================

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

// =============================================================================
// Grid
// =============================================================================

pub const DEFAULT_RADIUS_KM: f64 = 100.0;
pub const DEFAULT_INCLUDE_CLOSED: bool = false;
pub const DEFAULT_INCLUDE_SMALL: bool = false;
pub const DEFAULT_INCLUDE_MEDIUM: bool = true;

// =============================================================================
// Logging
// =============================================================================

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "airdist.log";
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

/// Default database location (`~/.airdist/airdist.db`).
pub fn default_database_path() -> PathBuf {
    config_directory().join(DEFAULT_DATABASE_FILE)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            dataset: DatasetSettings::default(),
            database: DatabaseSettings::default(),
            import: ImportSettings::default(),
            retry: RetrySettings::default(),
            grid: GridSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            airports_file: PathBuf::from(DEFAULT_AIRPORTS_FILE),
            delimiter: char::from(crate::airport::DEFAULT_DELIMITER),
            skip_small_airports: DEFAULT_SKIP_SMALL_AIRPORTS,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            schema_script: None,
            debug_queries: DEFAULT_DEBUG_QUERIES,
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            validate: DEFAULT_VALIDATE,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            include_closed: DEFAULT_INCLUDE_CLOSED,
            include_small: DEFAULT_INCLUDE_SMALL,
            include_medium: DEFAULT_INCLUDE_MEDIUM,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file: DEFAULT_LOG_FILE.to_string(),
            level: DEFAULT_LOG_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.dataset.delimiter, ';');
        assert!(config.dataset.skip_small_airports);
        assert!(config.database.schema_script.is_none());
        assert!(config.database.path.ends_with(".airdist/airdist.db"));
        assert_eq!(config.import.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.import.workers, 1);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay().as_millis(), 1000);
        assert_eq!(config.grid.radius_km, 100.0);
        assert_eq!(config.grid.filter(), crate::grid::PopulateFilter::default());
        assert_eq!(config.logging.level, LogLevel::Info);
    }
}
