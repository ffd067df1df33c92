//! Proximity grid for radius-bounded airport searches.
//!
//! The [`GeoGridIndex`] buckets airports into 0.1°×0.1° [`GridCell`]s and
//! answers "which airports lie within R km of this one" by scanning a window
//! of cells around the query, wrapping across the antimeridian and poles.
//!
//! # Architecture
//!
//! ```text
//! GeoGridIndex
//! ├── cells: [1327,2034] → { "Sofia Airport" → Airport }
//! │          [1326,2075] → { "Burgas Airport" → Airport }
//! └── memo:  ("Sofia Airport", 42.7, 23.4, 400 km) → [Burgas 335 km]  @ generation 2
//! ```
//!
//! # Approximations
//!
//! The window is sized from a fixed cell edge and the cosine of its most
//! poleward row. Latitude indices wrap like longitude, so searches close to a
//! pole also visit rows near the opposite pole; those candidates are then
//! rejected by their true distance.

mod bounds;
mod cell;
mod index;

pub use bounds::{
    coordinate_to_index, index_to_coordinate, Bounds, CELLS_PER_DEGREE, LAT_CELLS, LON_CELLS,
};
pub use cell::GridCell;
pub use index::{GeoGridIndex, Nearby, PopulateFilter, KM_PER_CELL_EDGE};
