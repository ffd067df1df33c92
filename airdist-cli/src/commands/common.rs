//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use airdist::airport::{AirportIndex, DatasetParser};
use airdist::config::{config_file_path, ConfigFile};
use airdist::log::TracingLogger;
use airdist::logging::{init_logging, LoggingGuard};
use airdist::store::{RetryPolicy, Schema, SqlGateway, SqliteExecutor};

use crate::error::CliError;

/// Resolve the config file path: `--config` first, then the default.
pub fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    cli_path.map(Path::to_path_buf).unwrap_or_else(config_file_path)
}

/// Load configuration, falling back to defaults when the file is missing.
pub fn load_config(cli_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    Ok(ConfigFile::load_from(&resolve_config_path(cli_path))?)
}

/// Install file and stdout logging for a command run.
pub fn start_logging(config: &ConfigFile) -> Result<LoggingGuard, CliError> {
    init_logging(&config.logging).map_err(CliError::LoggingInit)
}

/// Load the cacheable airports, optionally from a different dataset file.
pub fn load_airports(
    config: &ConfigFile,
    dataset_override: Option<&Path>,
) -> Result<AirportIndex, CliError> {
    let path = dataset_override.unwrap_or(config.dataset.airports_file.as_path());
    let delimiter = u8::try_from(config.dataset.delimiter).map_err(|_| {
        CliError::InvalidArgument(format!(
            "dataset delimiter '{}' is not an ASCII character",
            config.dataset.delimiter
        ))
    })?;
    let parser = DatasetParser::new(delimiter);
    Ok(AirportIndex::from_dataset(
        path,
        parser,
        config.dataset.skip_small_airports,
    )?)
}

/// Open the SQLite store and make sure its schema exists.
pub fn open_store(config: &ConfigFile) -> Result<Arc<SqlGateway>, CliError> {
    let settings = &config.database;
    if let Some(parent) = settings.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| CliError::StoreOpen {
                path: settings.path.clone(),
                message: e.to_string(),
            })?;
        }
    }

    let executor = SqliteExecutor::open(&settings.path).map_err(|e| CliError::StoreOpen {
        path: settings.path.clone(),
        message: e.to_string(),
    })?;
    let gateway = SqlGateway::new(Arc::new(executor), Arc::new(TracingLogger::new()))
        .with_retry(RetryPolicy::from(&config.retry))
        .with_debug_queries(settings.debug_queries);
    gateway.initialize(&Schema::from_option(settings.schema_script.clone()))?;
    Ok(Arc::new(gateway))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_config_path_wins() {
        let path = Path::new("/tmp/custom.ini");
        assert_eq!(resolve_config_path(Some(path)), PathBuf::from("/tmp/custom.ini"));
        assert_eq!(resolve_config_path(None), config_file_path());
    }

    #[test]
    fn test_open_store_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = ConfigFile::default();
        config.database.path = temp_dir.path().join("nested/airdist.db");

        open_store(&config).unwrap();
        assert!(config.database.path.exists());
    }

    #[test]
    fn test_missing_dataset() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigFile::default();
        let missing = temp_dir.path().join("missing.csv");
        let err = load_airports(&config, Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("missing.csv"));
    }
}
