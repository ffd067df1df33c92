//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use airdist::airport::{AirportIndexError, MatrixError};
use airdist::config::ConfigFileError;
use airdist::logging::LoggingError;
use airdist::pipeline::PipelineError;
use airdist::store::StoreError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(LoggingError),
    /// Configuration error
    Config(ConfigFileError),
    /// Failed to load the airport dataset
    Dataset(AirportIndexError),
    /// Failed to load a distance matrix
    Matrix(MatrixError),
    /// Failed to open the database file
    StoreOpen { path: PathBuf, message: String },
    /// Store operation failed
    Store(StoreError),
    /// Import stopped
    Pipeline(PipelineError),
    /// No airport with this code in the dataset
    UnknownAirport(String),
    /// Invalid argument value
    InvalidArgument(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Dataset(AirportIndexError::NotFound(_)) => {
                eprintln!();
                eprintln!("Set airports_file under [dataset] in the config file,");
                eprintln!("or pass --dataset <path>.");
            }
            CliError::Pipeline(e) => {
                if let Some(report) = e.report() {
                    eprintln!();
                    eprintln!("Partial result: {}", report);
                    eprintln!("Re-running the import resumes where it stopped.");
                }
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Dataset(e) => write!(f, "Failed to load airports: {}", e),
            CliError::Matrix(e) => write!(f, "Failed to load distance matrix: {}", e),
            CliError::StoreOpen { path, message } => {
                write!(f, "Failed to open database '{}': {}", path.display(), message)
            }
            CliError::Store(e) => write!(f, "Database error: {}", e),
            CliError::Pipeline(e) => write!(f, "Import failed: {}", e),
            CliError::UnknownAirport(code) => write!(f, "Unknown airport '{}'", code),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Dataset(e) => Some(e),
            CliError::Matrix(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<AirportIndexError> for CliError {
    fn from(e: AirportIndexError) -> Self {
        CliError::Dataset(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}
