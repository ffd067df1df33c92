//! `airdist distance`: cached or computed distance between two airports.

use std::path::{Path, PathBuf};

use airdist::airport::Airport;
use airdist::store::{AirportStore, DistanceStore, SqlGateway};
use clap::Args;

use super::common::{load_airports, load_config, open_store};
use crate::error::CliError;

/// Arguments for the distance command.
#[derive(Debug, Args)]
pub struct DistanceArgs {
    /// First airport UID
    pub a: String,

    /// Second airport UID
    pub b: String,

    /// Dataset file (overrides dataset.airports_file)
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

/// Run the distance command.
///
/// Reads the cache first. Pairs not cached yet are measured from the stored
/// airports, falling back to the dataset for airports not stored either.
pub fn run(config_path: Option<&Path>, args: DistanceArgs) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    if let Some(km) = store.get_distance(&args.a, &args.b)? {
        println!("{} - {}: {:.2} km (cached)", args.a, args.b, km);
        return Ok(());
    }

    let (a, b) = match stored_pair(&store, &args.a, &args.b)? {
        Some(pair) => pair,
        None => {
            let index = load_airports(&config, args.dataset.as_deref())?;
            let lookup = |uid: &str| {
                index
                    .get(uid)
                    .cloned()
                    .ok_or_else(|| CliError::UnknownAirport(uid.to_string()))
            };
            (lookup(&args.a)?, lookup(&args.b)?)
        }
    };
    println!(
        "{} - {}: {:.2} km (computed, not cached yet)",
        args.a,
        args.b,
        a.distance_to(&b)
    );
    Ok(())
}

/// Both airports from the store, or `None` if either is not stored.
fn stored_pair(store: &SqlGateway, a: &str, b: &str) -> Result<Option<(Airport, Airport)>, CliError> {
    let Some(a) = store.get_airport(a)? else {
        return Ok(None);
    };
    Ok(store.get_airport(b)?.map(|b| (a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdist::log::NoOpLogger;
    use airdist::store::{Schema, SqliteExecutor};
    use std::sync::Arc;

    fn store() -> SqlGateway {
        let executor = Arc::new(SqliteExecutor::open_in_memory().unwrap());
        let gateway = SqlGateway::new(executor, Arc::new(NoOpLogger));
        gateway.initialize(&Schema::Builtin).unwrap();
        gateway
    }

    #[test]
    fn test_stored_pair_needs_both_airports() {
        let store = store();
        store
            .import_airports(&[
                Airport::builder("Sofia", 42.7, 23.4).primary_code("SOF").build(),
                Airport::builder("Burgas", 42.6, 27.5).primary_code("BOJ").build(),
            ])
            .unwrap();

        let (a, b) = stored_pair(&store, "SOF", "BOJ").unwrap().unwrap();
        assert_eq!(a.name, "Sofia");
        assert_eq!(b.name, "Burgas");
        assert!(stored_pair(&store, "SOF", "LHR").unwrap().is_none());
        assert!(stored_pair(&store, "LHR", "SOF").unwrap().is_none());
    }
}
