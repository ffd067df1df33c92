//! Grid cell coordinate type.
//!
//! A [`GridCell`] identifies a 0.1°×0.1° bucket of the proximity grid by its
//! row and column index. Cells are addressed by shifted, scaled indices so
//! both axes start at zero.

use std::fmt;

use super::bounds::{self, Bounds, LAT_CELLS, LON_CELLS};

/// A 0.1°×0.1° grid cell coordinate.
///
/// # Examples
///
/// ```
/// use airdist::grid::GridCell;
///
/// let cell = GridCell::from_lat_lon(42.7, 23.4).unwrap();
/// assert_eq!(cell, GridCell::new(1327, 2034));
/// assert_eq!(format!("{}", cell), "[1327,2034]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Row index, `0..LAT_CELLS`.
    pub lat: u32,
    /// Column index, `0..LON_CELLS`.
    pub lon: u32,
}

impl GridCell {
    pub fn new(lat: u32, lon: u32) -> Self {
        Self { lat, lon }
    }

    /// Cell holding the given coordinates, or `None` when they are outside
    /// the world bounds.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Option<Self> {
        if !Bounds::WORLD.contains(lat, lon) {
            return None;
        }
        let (lat_idx, lon_idx) = bounds::coordinate_to_index(lat, lon);
        Some(Self::new(lat_idx, lon_idx))
    }

    /// Centre coordinates of the cell.
    pub fn center(&self) -> (f64, f64) {
        bounds::index_to_coordinate(self.lat, self.lon)
    }

    /// Cell `(d_lat, d_lon)` steps away, wrapping both axes.
    pub fn offset(&self, d_lat: i64, d_lon: i64) -> Self {
        Self {
            lat: wrap(self.lat as i64 + d_lat, LAT_CELLS),
            lon: wrap(self.lon as i64 + d_lon, LON_CELLS),
        }
    }
}

/// Step count between two indices on a wrapping axis.
pub(crate) fn wrapped_distance(a: u32, b: u32, extent: u32) -> u32 {
    let d = a.abs_diff(b);
    d.min(extent - d)
}

fn wrap(index: i64, extent: u32) -> u32 {
    index.rem_euclid(extent as i64) as u32
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lat_lon() {
        let cell = GridCell::from_lat_lon(51.5, -0.42).unwrap();
        assert_eq!(cell.lat, 1415);
        assert_eq!(cell.lon, 1796);
    }

    #[test]
    fn test_out_of_bounds_has_no_cell() {
        assert!(GridCell::from_lat_lon(95.0, 0.0).is_none());
        assert!(GridCell::from_lat_lon(0.0, 181.0).is_none());
        assert!(GridCell::from_lat_lon(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_offset_wraps_longitude() {
        let cell = GridCell::new(900, 3599);
        assert_eq!(cell.offset(0, 3), GridCell::new(900, 1));
        assert_eq!(GridCell::new(900, 1).offset(0, -3), GridCell::new(900, 3599));
    }

    #[test]
    fn test_offset_wraps_latitude() {
        let cell = GridCell::new(0, 10);
        assert_eq!(cell.offset(-1, 0), GridCell::new(1800, 10));
    }

    #[test]
    fn test_wrapped_distance() {
        assert_eq!(wrapped_distance(10, 20, LON_CELLS), 10);
        assert_eq!(wrapped_distance(0, 3600, LON_CELLS), 1);
        assert_eq!(wrapped_distance(3600, 0, LON_CELLS), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(GridCell::new(0, 0).to_string(), "[0,0]");
    }

    #[test]
    fn test_hash_consistency() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(GridCell::new(1327, 2034));
        set.insert(GridCell::new(1327, 2034));
        set.insert(GridCell::new(1326, 2075));
        assert_eq!(set.len(), 2);
    }
}
