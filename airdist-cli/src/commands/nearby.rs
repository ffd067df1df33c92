//! `airdist nearby`: airports within a radius of another.

use std::path::{Path, PathBuf};

use airdist::grid::GeoGridIndex;
use clap::Args;

use super::common::{load_airports, load_config};
use crate::error::CliError;

/// Arguments for the nearby command.
#[derive(Debug, Args)]
pub struct NearbyArgs {
    /// Airport UID (primary code, or primary_secondary)
    pub code: String,

    /// Search radius in km (overrides grid.radius_km)
    #[arg(long)]
    pub radius: Option<f64>,

    /// Dataset file (overrides dataset.airports_file)
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

/// Run the nearby command.
pub fn run(config_path: Option<&Path>, args: NearbyArgs) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let radius = args.radius.unwrap_or(config.grid.radius_km);
    if radius.is_nan() || radius < 0.0 {
        return Err(CliError::InvalidArgument(format!(
            "radius must be a non-negative number, got {}",
            radius
        )));
    }

    let index = load_airports(&config, args.dataset.as_deref())?;
    let origin = index
        .get(&args.code)
        .ok_or_else(|| CliError::UnknownAirport(args.code.clone()))?;

    let grid = GeoGridIndex::new();
    grid.populate(index.iter().cloned(), config.grid.filter());
    let nearby = grid.find_nearby(origin, radius);

    println!(
        "{} airport(s) within {} km of {} ({})",
        nearby.len(),
        radius,
        origin.name,
        args.code
    );
    for entry in &nearby {
        let code = entry.airport.uid().unwrap_or_default();
        println!(
            "  {:>9.1} km  {:<12} {}",
            entry.distance_km, code, entry.airport.name
        );
    }
    Ok(())
}
