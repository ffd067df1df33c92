//! `airdist validate`: re-count cached pairs and repair gaps.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use airdist::log::TracingLogger;
use airdist::pipeline::{format_elapsed, DistanceCache, ImportOptions};
use clap::Args;

use super::common::{load_airports, load_config, open_store, start_logging};
use crate::error::CliError;

/// Arguments for the validate command.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Dataset file (overrides dataset.airports_file)
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

/// Run the validate command.
pub fn run(config_path: Option<&Path>, args: ValidateArgs) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let _guard = start_logging(&config)?;

    let index = load_airports(&config, args.dataset.as_deref())?;
    let store = open_store(&config)?;
    let cache = DistanceCache::new(
        store,
        Arc::new(TracingLogger::new()),
        ImportOptions::from(&config.import),
    );

    let report = cache.validate(index.airports())?;
    println!(
        "Validated {} airports: {} records repaired in {}",
        report.airports,
        report.repaired,
        format_elapsed(report.elapsed)
    );
    Ok(())
}
