//! Airport index for O(1) UID lookup and cacheable-airport selection.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::parser::{DatasetParser, ParseError};
use super::{Airport, AirportClass};

/// Error type for airport index operations.
#[derive(Debug, thiserror::Error)]
pub enum AirportIndexError {
    #[error("Airport dataset not found at: {0}")]
    NotFound(PathBuf),
    #[error("Failed to parse airport dataset: {0}")]
    ParseError(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Select the airports that take part in the distance cache.
///
/// Keeps airports that have a primary code, drops `small_airport` entries
/// when `skip_small` is set, and deduplicates by UID (first occurrence wins).
/// Input order is preserved.
pub fn cacheable_airports(
    airports: impl IntoIterator<Item = Airport>,
    skip_small: bool,
) -> Vec<Airport> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut selected = Vec::new();
    let mut duplicates = 0usize;

    for airport in airports {
        let Some(uid) = airport.uid() else {
            continue;
        };
        if skip_small && airport.class == AirportClass::Small {
            continue;
        }
        if !seen.insert(uid) {
            duplicates += 1;
            continue;
        }
        selected.push(airport);
    }

    if duplicates > 0 {
        tracing::debug!(duplicates, "Dropped airports with duplicate UIDs");
    }
    selected
}

/// Index of cacheable airports for O(1) UID lookup.
///
/// Keeps the selection order so pipeline runs enumerate pairs
/// deterministically.
#[derive(Debug, Default)]
pub struct AirportIndex {
    airports: Vec<Airport>,
    by_uid: HashMap<String, usize>,
}

impl AirportIndex {
    /// Create an empty airport index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from already selected airports.
    ///
    /// Airports without a UID and repeated UIDs are dropped.
    pub fn from_airports(airports: impl IntoIterator<Item = Airport>) -> Self {
        let mut index = Self::new();
        for airport in cacheable_airports(airports, false) {
            if let Some(uid) = airport.uid() {
                index.by_uid.insert(uid, index.airports.len());
                index.airports.push(airport);
            }
        }
        index
    }

    /// Build an index from a dataset file.
    pub fn from_dataset<P: AsRef<Path>>(
        path: P,
        parser: DatasetParser,
        skip_small: bool,
    ) -> Result<Self, AirportIndexError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AirportIndexError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "Loading airport dataset");
        Self::from_reader(file, parser, skip_small)
    }

    /// Build an index from a reader over dataset text.
    pub fn from_reader<R: Read>(
        reader: R,
        parser: DatasetParser,
        skip_small: bool,
    ) -> Result<Self, AirportIndexError> {
        let parsed = parser.parse_all(reader)?;
        let total = parsed.len();
        let index = Self::from_airports(cacheable_airports(parsed, skip_small));
        tracing::info!(
            parsed = total,
            cacheable = index.len(),
            "Built airport index"
        );
        Ok(index)
    }

    /// Get an airport by UID, case-insensitive.
    pub fn get(&self, uid: &str) -> Option<&Airport> {
        self.by_uid
            .get(uid)
            .or_else(|| self.by_uid.get(&uid.to_uppercase()))
            .map(|&i| &self.airports[i])
    }

    /// Returns the number of airports in the index.
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// All indexed airports in selection order.
    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    /// Returns an iterator over all airports.
    pub fn iter(&self) -> impl Iterator<Item = &Airport> {
        self.airports.iter()
    }
}
