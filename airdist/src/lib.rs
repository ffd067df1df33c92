//! airdist - Airport proximity grid and pairwise distance cache
//!
//! This library answers two questions about a dataset of airports:
//!
//! - which airports lie within R km of a given one ([`grid`]), and
//! - what is the great-circle distance between any two of them, persisted
//!   once per pair in a relational store ([`pipeline`], [`store`]).
//!
//! # Example
//!
//! ```
//! use airdist::airport::Airport;
//! use airdist::grid::{GeoGridIndex, PopulateFilter};
//!
//! let sofia = Airport::builder("Sofia", 42.7, 23.4).primary_code("SOF").build();
//! let burgas = Airport::builder("Burgas", 42.6, 27.5).primary_code("BOJ").build();
//!
//! let index = GeoGridIndex::new();
//! index.populate([sofia.clone(), burgas], PopulateFilter::all());
//!
//! let nearby = index.find_nearby(&sofia, 400.0);
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].airport.name, "Burgas");
//! ```

pub mod airport;
pub mod config;
pub mod geodesic;
pub mod grid;
pub mod log;
pub mod logging;
pub mod pipeline;
pub mod store;

/// Version of the airdist library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
