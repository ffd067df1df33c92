//! `airdist import`: load the dataset, store airports, cache distances.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use airdist::airport::DistanceMatrix;
use airdist::log::TracingLogger;
use airdist::pipeline::{format_elapsed, DistanceCache, ImportOptions};
use airdist::store::AirportStore;
use clap::Args;

use super::common::{load_airports, load_config, open_store, start_logging};
use crate::error::CliError;

/// Arguments for the import command.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Dataset file (overrides dataset.airports_file)
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Records per bulk upsert (overrides import.batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Worker threads (overrides import.workers)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Skip the validation and repair pass
    #[arg(long)]
    pub no_validate: bool,

    /// Seed the cache from a precomputed distance matrix first
    #[arg(long)]
    pub matrix: Option<PathBuf>,
}

impl ImportArgs {
    fn options(&self, mut options: ImportOptions) -> Result<ImportOptions, CliError> {
        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 {
                return Err(CliError::InvalidArgument(
                    "--batch-size must be at least 1".to_string(),
                ));
            }
            options.batch_size = batch_size;
        }
        if let Some(workers) = self.workers {
            options.workers = workers.max(1);
        }
        if self.no_validate {
            options.validate = false;
        }
        Ok(options)
    }
}

/// Run the import command.
pub fn run(config_path: Option<&Path>, args: ImportArgs) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let _guard = start_logging(&config)?;
    let options = args.options(ImportOptions::from(&config.import))?;
    let start = Instant::now();

    let index = load_airports(&config, args.dataset.as_deref())?;
    let store = open_store(&config)?;
    let cache = DistanceCache::new(store.clone(), Arc::new(TracingLogger::new()), options);

    println!("Importing {} airports", index.len());
    let stored = cache.import_airports(index.airports())?;
    println!(
        "  Airports stored:   {} new, {} total",
        stored,
        store.count_airports()?
    );

    if let Some(path) = &args.matrix {
        let matrix = DistanceMatrix::load(path).map_err(CliError::Matrix)?;
        let report = cache.import_matrix(&matrix, index.airports())?;
        println!("  Matrix records:    {}", report.inserted);
    }

    let report = cache.import_pairwise_distances(index.airports())?;
    println!("  Already complete:  {}", report.skipped_complete);
    println!("  Inserted:          {}", report.inserted);
    println!("  Repaired:          {}", report.repaired);
    if report.failed_batches > 0 {
        println!("  Failed batches:    {}", report.failed_batches);
    }
    println!();
    println!(
        "Cached {} new distances in {}",
        report.total_inserted(),
        format_elapsed(start.elapsed())
    );
    Ok(())
}
