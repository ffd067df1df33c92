//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, path, show)
//! - [`distance`] - Distance between two airports
//! - [`import`] - Airport and pairwise distance import
//! - [`nearby`] - Radius search around an airport
//! - [`validate`] - Validation and repair of the distance cache

pub mod common;
pub mod config;
pub mod distance;
pub mod import;
pub mod nearby;
pub mod validate;
