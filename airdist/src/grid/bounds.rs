//! Coordinate domain of the grid and the coordinate/index transforms.

/// Grid cells per degree of latitude or longitude (0.1° resolution).
pub const CELLS_PER_DEGREE: f64 = 10.0;

/// Number of latitude rows: indices `0..=1800`.
pub const LAT_CELLS: u32 = 1801;

/// Number of longitude columns: indices `0..=3600`.
pub const LON_CELLS: u32 = 3601;

/// Closed latitude/longitude domain covered by the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// The whole globe.
    pub const WORLD: Bounds = Bounds {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    /// Whether the coordinates fall inside the domain. NaN never does.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::WORLD
    }
}

/// Map in-bounds coordinates to `(lat_index, lon_index)`.
///
/// Shifts each axis by its domain maximum and scales by the resolution,
/// rounding to the nearest cell. Inputs outside [`Bounds::WORLD`] are
/// clamped onto the edge rows and columns.
pub fn coordinate_to_index(lat: f64, lon: f64) -> (u32, u32) {
    let world = Bounds::WORLD;
    let lat_idx = ((lat + world.max_lat) * CELLS_PER_DEGREE).round();
    let lon_idx = ((lon + world.max_lon) * CELLS_PER_DEGREE).round();
    (
        lat_idx.clamp(0.0, (LAT_CELLS - 1) as f64) as u32,
        lon_idx.clamp(0.0, (LON_CELLS - 1) as f64) as u32,
    )
}

/// Inverse of [`coordinate_to_index`]: the centre coordinates of a cell.
pub fn index_to_coordinate(lat_idx: u32, lon_idx: u32) -> (f64, f64) {
    let world = Bounds::WORLD;
    (
        lat_idx as f64 / CELLS_PER_DEGREE - world.max_lat,
        lon_idx as f64 / CELLS_PER_DEGREE - world.max_lon,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_contains_edges() {
        let world = Bounds::WORLD;
        assert!(world.contains(90.0, 180.0));
        assert!(world.contains(-90.0, -180.0));
        assert!(!world.contains(90.01, 0.0));
        assert!(!world.contains(0.0, -180.5));
        assert!(!world.contains(f64::NAN, 0.0));
    }

    #[test]
    fn test_index_extremes() {
        assert_eq!(coordinate_to_index(-90.0, -180.0), (0, 0));
        assert_eq!(coordinate_to_index(90.0, 180.0), (1800, 3600));
        assert_eq!(coordinate_to_index(0.0, 0.0), (900, 1800));
    }

    #[test]
    fn test_index_rounds_to_nearest_cell() {
        assert_eq!(coordinate_to_index(42.66, 23.44), (1327, 2034));
        assert_eq!(coordinate_to_index(-33.94, -118.41), (561, 616));
    }

    #[test]
    fn test_index_to_coordinate() {
        let (lat, lon) = index_to_coordinate(1327, 2034);
        assert!((lat - 42.7).abs() < 1e-9);
        assert!((lon - 23.4).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_resolution(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let (lat_idx, lon_idx) = coordinate_to_index(lat, lon);
            prop_assert!(lat_idx < LAT_CELLS);
            prop_assert!(lon_idx < LON_CELLS);
            let (back_lat, back_lon) = index_to_coordinate(lat_idx, lon_idx);
            prop_assert!((back_lat - lat).abs() <= 0.1, "{} -> {}", lat, back_lat);
            prop_assert!((back_lon - lon).abs() <= 0.1, "{} -> {}", lon, back_lon);
        }
    }
}
