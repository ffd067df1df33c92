//! Configuration file for airdist (`~/.airdist/config.ini`).
//!
//! Settings structs live in [`settings`], constants and `Default` impls in
//! [`defaults`], INI parsing in `parser` and the commented INI writer in
//! `writer`. A missing file means "all defaults".
//!
//! # Example
//!
//! ```
//! use airdist::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.import.batch_size, 1000);
//! assert!(config.import.validate);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, DatabaseSettings, DatasetSettings, GridSettings, ImportSettings, LoggingSettings,
    RetrySettings,
};
