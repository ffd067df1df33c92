//! GeoGridIndex: in-memory proximity grid over airports.
//!
//! Airports are bucketed into 0.1°×0.1° [`GridCell`]s. Only occupied cells
//! are stored, in a `DashMap` keyed by cell, so the index is cheap to build
//! for sparse datasets and safe to query from many threads.
//!
//! # Thread Safety
//!
//! - Cell-level access via `DashMap` (concurrent reads, per-shard write locks)
//! - Radius results are memoised in a second `DashMap`, stamped with the
//!   generation they were computed under. Every mutation bumps the
//!   generation after the cells are updated, so a stale result is never
//!   served.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::bounds::{CELLS_PER_DEGREE, LAT_CELLS, LON_CELLS};
use super::cell::{wrapped_distance, GridCell};
use crate::airport::{Airport, AirportClass};

/// Conservative length of a cell edge in kilometres.
///
/// 0.1° of latitude is 11.06 to 11.17 km on WGS-84; the shorter figure keeps
/// the scan window from undershooting the radius.
pub const KM_PER_CELL_EDGE: f64 = 11.0;

/// An airport found by a radius search together with its distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby {
    pub airport: Airport,
    pub distance_km: f64,
}

/// Classification filter applied by [`GeoGridIndex::populate`].
///
/// Classes other than closed, small and medium are always included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateFilter {
    pub include_closed: bool,
    pub include_small: bool,
    pub include_medium: bool,
}

impl PopulateFilter {
    /// Include every classification.
    pub fn all() -> Self {
        Self {
            include_closed: true,
            include_small: true,
            include_medium: true,
        }
    }

    pub fn allows(&self, class: &AirportClass) -> bool {
        match class {
            AirportClass::Closed => self.include_closed,
            AirportClass::Small => self.include_small,
            AirportClass::Medium => self.include_medium,
            _ => true,
        }
    }
}

impl Default for PopulateFilter {
    fn default() -> Self {
        Self {
            include_closed: false,
            include_small: false,
            include_medium: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    name: String,
    coordinates: crate::airport::Coordinates,
    radius_bits: u64,
}

#[derive(Debug, Clone)]
struct MemoEntry {
    generation: u64,
    results: Vec<Nearby>,
}

/// Scan extent along one axis.
#[derive(Debug, Clone, Copy)]
enum Span {
    /// The window covers the whole axis; visit every index once.
    Full,
    /// Visit indices within this many steps of the origin.
    Jumps(u32),
}

impl Span {
    fn new(jumps: u32, extent: u32) -> Self {
        if 2 * u64::from(jumps) + 1 >= u64::from(extent) {
            Span::Full
        } else {
            Span::Jumps(jumps)
        }
    }

    fn width(&self, extent: u32) -> u64 {
        match self {
            Span::Full => u64::from(extent),
            Span::Jumps(j) => 2 * u64::from(*j) + 1,
        }
    }

    fn covers(&self, origin: u32, index: u32, extent: u32) -> bool {
        match self {
            Span::Full => true,
            Span::Jumps(j) => wrapped_distance(origin, index, extent) <= *j,
        }
    }

    fn offsets(&self, origin: u32, extent: u32) -> Box<dyn Iterator<Item = i64>> {
        match *self {
            Span::Full => {
                let origin = i64::from(origin);
                Box::new((0..i64::from(extent)).map(move |i| i - origin))
            }
            Span::Jumps(j) => Box::new(-i64::from(j)..=i64::from(j)),
        }
    }
}

/// In-memory proximity grid over airports.
///
/// # Example
///
/// ```
/// use airdist::airport::Airport;
/// use airdist::grid::GeoGridIndex;
///
/// let grid = GeoGridIndex::new();
/// let sofia = Airport::builder("Sofia", 42.7, 23.4).primary_code("SOF").build();
/// let burgas = Airport::builder("Burgas", 42.6, 27.5).primary_code("BOJ").build();
/// grid.insert(sofia.clone());
/// grid.insert(burgas);
///
/// let nearby = grid.find_nearby(&sofia, 400.0);
/// assert_eq!(nearby.len(), 1);
/// assert_eq!(nearby[0].airport.name, "Burgas");
/// ```
#[derive(Debug, Default)]
pub struct GeoGridIndex {
    cells: DashMap<GridCell, HashMap<String, Airport>>,
    memo: DashMap<MemoKey, MemoEntry>,
    generation: AtomicU64,
}

impl GeoGridIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an airport into its cell, keyed by name.
    ///
    /// Returns `false` (and changes nothing) when the coordinates are out of
    /// bounds. An airport with the same name in the same cell is replaced.
    pub fn insert(&self, airport: Airport) -> bool {
        let Some(cell) = GridCell::from_lat_lon(airport.latitude, airport.longitude) else {
            tracing::debug!(
                name = %airport.name,
                lat = airport.latitude,
                lon = airport.longitude,
                "Ignoring out-of-bounds airport"
            );
            return false;
        };
        self.cells
            .entry(cell)
            .or_default()
            .insert(airport.name.clone(), airport);
        self.invalidate();
        true
    }

    /// Bulk insert airports whose classification passes `filter`.
    ///
    /// Returns the number of airports placed in the grid.
    pub fn populate(
        &self,
        airports: impl IntoIterator<Item = Airport>,
        filter: PopulateFilter,
    ) -> usize {
        let mut inserted = 0usize;
        let mut filtered = 0usize;
        for airport in airports {
            if !filter.allows(&airport.class) {
                filtered += 1;
                continue;
            }
            let Some(cell) = GridCell::from_lat_lon(airport.latitude, airport.longitude) else {
                continue;
            };
            self.cells
                .entry(cell)
                .or_default()
                .insert(airport.name.clone(), airport);
            inserted += 1;
        }
        self.invalidate();
        tracing::debug!(inserted, filtered, cells = self.cells.len(), "Populated grid");
        inserted
    }

    /// Remove every airport.
    pub fn clear(&self) {
        self.cells.clear();
        self.invalidate();
    }

    /// Number of airports in the grid.
    pub fn len(&self) -> usize {
        self.cells.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Airports in a cell (cloned), empty when the cell is unoccupied.
    pub fn airports_in(&self, cell: &GridCell) -> Vec<Airport> {
        self.cells
            .get(cell)
            .map(|entry| entry.value().values().cloned().collect())
            .unwrap_or_default()
    }

    /// Current mutation generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Airports within `max_radius_km` of `airport`, ascending by distance.
    ///
    /// The query airport itself (matched by coordinates) is excluded, as is
    /// everything farther than the radius. Results are memoised per
    /// `(name, coordinates, radius)` until the next mutation.
    pub fn find_nearby(&self, airport: &Airport, max_radius_km: f64) -> Vec<Nearby> {
        if !(max_radius_km >= 0.0) {
            return Vec::new();
        }
        let Some(origin) = GridCell::from_lat_lon(airport.latitude, airport.longitude) else {
            return Vec::new();
        };

        let key = MemoKey {
            name: airport.name.clone(),
            coordinates: airport.coordinates(),
            radius_bits: max_radius_km.to_bits(),
        };
        let generation = self.generation();
        if let Some(entry) = self.memo.get(&key) {
            if entry.generation == generation {
                return entry.results.clone();
            }
        }

        let results = self.scan(airport, origin, max_radius_km);
        self.memo.insert(
            key,
            MemoEntry {
                generation,
                results: results.clone(),
            },
        );
        results
    }

    fn scan(&self, query: &Airport, origin: GridCell, max_radius_km: f64) -> Vec<Nearby> {
        let (lat_span, lon_span) = window(query.latitude, max_radius_km);
        let window_cells = lat_span.width(LAT_CELLS) * lon_span.width(LON_CELLS);
        let mut results = Vec::new();

        if window_cells > self.cells.len() as u64 {
            for entry in self.cells.iter() {
                let cell = entry.key();
                if lat_span.covers(origin.lat, cell.lat, LAT_CELLS)
                    && lon_span.covers(origin.lon, cell.lon, LON_CELLS)
                {
                    collect(query, entry.value(), max_radius_km, &mut results);
                }
            }
        } else {
            for d_lat in lat_span.offsets(origin.lat, LAT_CELLS) {
                for d_lon in lon_span.offsets(origin.lon, LON_CELLS) {
                    if let Some(entry) = self.cells.get(&origin.offset(d_lat, d_lon)) {
                        collect(query, entry.value(), max_radius_km, &mut results);
                    }
                }
            }
        }

        results
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.memo.clear();
    }
}

/// Scan window for a radius search from `latitude`.
///
/// One extra cell on each axis absorbs the rounding of both the origin and
/// the candidate into their cells. Longitude cells shrink with `cos(φ)`, so
/// the longitude count is widened for the most poleward row of the window.
fn window(latitude: f64, max_radius_km: f64) -> (Span, Span) {
    let lat_jumps = (max_radius_km / KM_PER_CELL_EDGE).ceil() + 1.0;
    let poleward = (latitude.abs() + lat_jumps / CELLS_PER_DEGREE).min(90.0);
    let cos = poleward.to_radians().cos();
    let lon_jumps = if cos > f64::EPSILON {
        (lat_jumps / cos).ceil()
    } else {
        f64::from(LON_CELLS)
    };

    (
        Span::new(to_jumps(lat_jumps, LAT_CELLS), LAT_CELLS),
        Span::new(to_jumps(lon_jumps, LON_CELLS), LON_CELLS),
    )
}

fn to_jumps(jumps: f64, extent: u32) -> u32 {
    jumps.min(f64::from(extent)) as u32
}

fn collect(
    query: &Airport,
    cell: &HashMap<String, Airport>,
    max_radius_km: f64,
    results: &mut Vec<Nearby>,
) {
    for candidate in cell.values() {
        if candidate.coordinates() == query.coordinates() {
            continue;
        }
        let distance_km = query.distance_to(candidate);
        if distance_km <= max_radius_km {
            let position = results.partition_point(|n| n.distance_km <= distance_km);
            results.insert(
                position,
                Nearby {
                    airport: candidate.clone(),
                    distance_km,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(name: &str, lat: f64, lon: f64) -> Airport {
        Airport::builder(name, lat, lon)
            .class(AirportClass::Large)
            .primary_code(name)
            .build()
    }

    fn scenario() -> (GeoGridIndex, Airport, Airport, Airport) {
        let grid = GeoGridIndex::new();
        let sof = airport("SOF", 42.7, 23.4);
        let boj = airport("BOJ", 42.6, 27.5);
        let lhr = airport("LHR", 51.5, -0.45);
        grid.insert(sof.clone());
        grid.insert(boj.clone());
        grid.insert(lhr.clone());
        (grid, sof, boj, lhr)
    }

    fn names(results: &[Nearby]) -> Vec<&str> {
        results.iter().map(|n| n.airport.name.as_str()).collect()
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    #[test]
    fn test_new_empty() {
        let grid = GeoGridIndex::new();
        assert!(grid.is_empty());
        assert_eq!(grid.len(), 0);
        assert_eq!(grid.cell_count(), 0);
    }

    #[test]
    fn test_insert_places_in_cell() {
        let grid = GeoGridIndex::new();
        assert!(grid.insert(airport("SOF", 42.7, 23.4)));
        let cell = GridCell::from_lat_lon(42.7, 23.4).unwrap();
        assert_eq!(grid.airports_in(&cell).len(), 1);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_insert_out_of_bounds_is_noop() {
        let grid = GeoGridIndex::new();
        assert!(!grid.insert(airport("BAD", 91.0, 0.0)));
        assert!(!grid.insert(airport("NAN", f64::NAN, 0.0)));
        assert!(grid.is_empty());
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    fn test_same_name_same_cell_last_write_wins() {
        let grid = GeoGridIndex::new();
        grid.insert(Airport::builder("Dup", 10.0, 10.0).primary_code("OLD").build());
        grid.insert(Airport::builder("Dup", 10.01, 10.01).primary_code("NEW").build());
        let cell = GridCell::from_lat_lon(10.0, 10.0).unwrap();
        let in_cell = grid.airports_in(&cell);
        assert_eq!(in_cell.len(), 1);
        assert_eq!(in_cell[0].primary_code.as_deref(), Some("NEW"));
    }

    #[test]
    fn test_populate_applies_default_filter() {
        let grid = GeoGridIndex::new();
        let airports = vec![
            Airport::builder("Large", 1.0, 1.0).class(AirportClass::Large).build(),
            Airport::builder("Medium", 2.0, 2.0).class(AirportClass::Medium).build(),
            Airport::builder("Small", 3.0, 3.0).class(AirportClass::Small).build(),
            Airport::builder("Closed", 4.0, 4.0).class(AirportClass::Closed).build(),
            Airport::builder("Heli", 5.0, 5.0).class(AirportClass::Heliport).build(),
        ];
        let inserted = grid.populate(airports.clone(), PopulateFilter::default());
        assert_eq!(inserted, 3);

        let grid = GeoGridIndex::new();
        assert_eq!(grid.populate(airports, PopulateFilter::all()), 5);
    }

    // =========================================================================
    // Radius search
    // =========================================================================

    #[test]
    fn test_find_nearby_scenario() {
        let (grid, sof, _, _) = scenario();
        let nearby = grid.find_nearby(&sof, 400.0);
        assert_eq!(names(&nearby), vec!["BOJ"]);
        assert!(nearby[0].distance_km > 325.0 && nearby[0].distance_km < 345.0);
    }

    #[test]
    fn test_find_nearby_is_symmetric_for_pair() {
        let (grid, sof, boj, _) = scenario();
        assert_eq!(names(&grid.find_nearby(&boj, 400.0)), vec!["SOF"]);
        assert_eq!(names(&grid.find_nearby(&sof, 400.0)), vec!["BOJ"]);
    }

    #[test]
    fn test_find_nearby_excludes_beyond_radius() {
        let (grid, sof, _, _) = scenario();
        assert!(grid.find_nearby(&sof, 300.0).is_empty());
    }

    #[test]
    fn test_find_nearby_large_radius_is_ascending() {
        let (grid, sof, _, _) = scenario();
        let nearby = grid.find_nearby(&sof, 5000.0);
        assert_eq!(names(&nearby), vec!["BOJ", "LHR"]);
        assert!(nearby.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_find_nearby_excludes_query_by_coordinates() {
        let grid = GeoGridIndex::new();
        grid.insert(airport("SOF", 42.7, 23.4));
        let twin = airport("Other name", 42.7, 23.4);
        assert!(grid.find_nearby(&twin, 50.0).is_empty());
    }

    #[test]
    fn test_find_nearby_zero_radius() {
        let (grid, sof, _, _) = scenario();
        assert!(grid.find_nearby(&sof, 0.0).is_empty());
    }

    #[test]
    fn test_find_nearby_invalid_radius() {
        let (grid, sof, _, _) = scenario();
        assert!(grid.find_nearby(&sof, -1.0).is_empty());
        assert!(grid.find_nearby(&sof, f64::NAN).is_empty());
    }

    #[test]
    fn test_find_nearby_across_antimeridian() {
        let grid = GeoGridIndex::new();
        let east = airport("EAST", -17.0, 179.95);
        let west = airport("WEST", -17.0, -179.95);
        grid.insert(east.clone());
        grid.insert(west);
        assert_eq!(names(&grid.find_nearby(&east, 50.0)), vec!["WEST"]);
    }

    #[test]
    fn test_find_nearby_high_latitude_longitude_spread() {
        let grid = GeoGridIndex::new();
        let a = airport("A", 70.0, 20.0);
        // A cell is about 3.8 km wide here, so B sits 20 columns away.
        let b = airport("B", 70.0, 22.0);
        grid.insert(a.clone());
        grid.insert(b);
        let nearby = grid.find_nearby(&a, 100.0);
        assert_eq!(names(&nearby), vec!["B"]);
    }

    #[test]
    fn test_find_nearby_probes_window_when_grid_is_dense() {
        let grid = GeoGridIndex::new();
        let origin = airport("O", 10.0, 10.0);
        grid.insert(origin.clone());
        for i in 0..40 {
            for j in 0..40 {
                let lat = 5.0 + i as f64 * 0.25;
                let lon = 5.0 + j as f64 * 0.25;
                grid.insert(airport(&format!("P{}_{}", i, j), lat, lon));
            }
        }
        let nearby = grid.find_nearby(&origin, 30.0);
        assert!(!nearby.is_empty());
        assert!(nearby.iter().all(|n| n.distance_km <= 30.0));
        assert!(nearby.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    // =========================================================================
    // Memoisation
    // =========================================================================

    #[test]
    fn test_memo_invalidated_by_insert() {
        let (grid, sof, _, _) = scenario();
        assert_eq!(grid.find_nearby(&sof, 400.0).len(), 1);

        grid.insert(airport("PDV", 42.07, 24.85));
        let nearby = grid.find_nearby(&sof, 400.0);
        assert_eq!(names(&nearby), vec!["PDV", "BOJ"]);
    }

    #[test]
    fn test_memo_invalidated_by_clear() {
        let (grid, sof, _, _) = scenario();
        assert_eq!(grid.find_nearby(&sof, 400.0).len(), 1);
        grid.clear();
        assert!(grid.find_nearby(&sof, 400.0).is_empty());
    }

    #[test]
    fn test_memo_distinguishes_radius() {
        let (grid, sof, _, _) = scenario();
        assert_eq!(grid.find_nearby(&sof, 400.0).len(), 1);
        assert_eq!(grid.find_nearby(&sof, 5000.0).len(), 2);
        assert_eq!(grid.find_nearby(&sof, 400.0).len(), 1);
    }

    #[test]
    fn test_generation_bumps_on_mutation() {
        let grid = GeoGridIndex::new();
        let before = grid.generation();
        grid.insert(airport("A", 1.0, 1.0));
        assert!(grid.generation() > before);
    }

    // =========================================================================
    // Window
    // =========================================================================

    #[test]
    fn test_window_widens_longitude_with_latitude() {
        let (Span::Jumps(lat_equator), Span::Jumps(lon_equator)) = window(0.0, 100.0) else {
            panic!("expected bounded spans");
        };
        let (Span::Jumps(lat_north), Span::Jumps(lon_north)) = window(60.0, 100.0) else {
            panic!("expected bounded spans");
        };
        assert_eq!(lat_equator, lat_north);
        assert!(lon_north > lon_equator);
    }

    #[test]
    fn test_window_collapses_to_full_axis() {
        let (lat, lon) = window(0.0, 30_000.0);
        assert!(matches!(lat, Span::Full));
        assert!(matches!(lon, Span::Full));
    }
}
