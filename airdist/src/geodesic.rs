//! Great-circle distance on the WGS-84 ellipsoid.
//!
//! Distances are computed with Karney's geodesic algorithm through the `geo`
//! crate and reported in kilometres.

use geo::{GeodesicDistance, Point};

use crate::airport::Coordinates;

const METERS_PER_KM: f64 = 1000.0;

/// Geodesic distance between two coordinates in kilometres.
///
/// Symmetric bit for bit: the arguments are put in a canonical order before
/// the computation, so `distance_km(a, b) == distance_km(b, a)` holds exactly.
/// Identical coordinates return exactly `0.0`.
///
/// Coordinates outside the valid latitude/longitude ranges give unspecified
/// results; callers validate them.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    if a == b {
        return 0.0;
    }
    let (first, second) = if precedes(&a, &b) { (a, b) } else { (b, a) };
    let from = Point::new(first.longitude, first.latitude);
    let to = Point::new(second.longitude, second.latitude);
    from.geodesic_distance(&to) / METERS_PER_KM
}

fn precedes(a: &Coordinates, b: &Coordinates) -> bool {
    (a.latitude, a.longitude)
        .partial_cmp(&(b.latitude, b.longitude))
        .map(|ordering| ordering.is_le())
        .unwrap_or(true)
}
