//! Process-wide logging setup.
//!
//! Writes to `<directory>/<file>` (truncated at startup) through a
//! non-blocking appender, and to stdout for interactive runs. The default
//! level comes from [`LoggingSettings`]; `RUST_LOG` overrides it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Logging setup errors.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to prepare log file {path}: {source}")]
    LogFile { path: PathBuf, source: io::Error },

    #[error("A global logger is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Install the global tracing subscriber.
///
/// Creates the log directory if needed and truncates the previous log file.
pub fn init_logging(settings: &LoggingSettings) -> Result<LoggingGuard, LoggingError> {
    let log_path = prepare_log_file(&settings.directory, &settings.file)?;

    let file_appender = tracing_appender::rolling::never(&settings.directory, &settings.file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(path = %log_path.display(), "Logging initialised");

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// `RUST_LOG` when set and valid, otherwise the configured level.
fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()))
}

/// Create the directory and truncate the log file, returning its path.
fn prepare_log_file(directory: &Path, file: &str) -> Result<PathBuf, LoggingError> {
    let log_path = directory.join(file);
    let to_error = |source| LoggingError::LogFile {
        path: log_path.clone(),
        source,
    };
    fs::create_dir_all(directory).map_err(to_error)?;
    fs::write(&log_path, "").map_err(to_error)?;
    Ok(log_path)
}
