//! Durable storage for airports and pairwise distances.
//!
//! # Architecture
//!
//! ```text
//! DistanceCache ──► DistanceStore / AirportStore   (traits)
//!                         │
//!                    SqlGateway      retry policy, query logging, SQL text
//!                         │
//!                   QueryExecutor    one transaction per call
//!                         │
//!                   SqliteExecutor   (rusqlite, bundled)
//! ```
//!
//! Store operations return `Result<_, StoreError>`. Transient failures are
//! retried inside the gateway; what reaches the caller is either exhausted
//! retries, which callers treat as a degraded result, or a fatal error
//! ([`StoreError::is_fatal`]) that stops the run.

mod airports;
mod distance;
mod executor;
mod gateway;
mod response;
mod schema;
mod sql;
mod sqlite;

use std::collections::HashMap;
use std::path::PathBuf;

pub use executor::QueryExecutor;
pub use gateway::{RetryPolicy, SqlGateway};
pub use response::{QueryError, QueryResponse, Row, Value};
pub use schema::{Schema, DEFAULT_SCHEMA, DISTANCES_TABLE, ENTITIES_TABLE};
pub use sql::{format_value, quote, InsertQuery, SqlValue};
pub use sqlite::SqliteExecutor;

use crate::airport::Airport;
use crate::pipeline::DistanceRecord;
use response::RollbackSuffix;

/// Errors surfaced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Every attempt failed.
    #[error("{operation} failed after {attempts} attempt(s): {source}{}", RollbackSuffix(.rollback))]
    Exhausted {
        operation: String,
        attempts: u32,
        source: QueryError,
        rollback: Option<QueryError>,
    },

    /// The connection is gone.
    #[error("store connection is closed")]
    Closed,

    #[error("schema initialization failed: {0}")]
    SchemaInit(#[source] QueryError),

    #[error("failed to read schema script {path}: {source}")]
    SchemaScript {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A result did not have the expected shape.
    #[error("unexpected result from {operation}: {message}")]
    Decode { operation: String, message: String },
}

impl StoreError {
    /// Whether the store is unusable and the run must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::Closed | StoreError::SchemaInit(_) | StoreError::SchemaScript { .. }
        )
    }
}

/// Pairwise distance cache.
///
/// UID arguments may be given in either order.
pub trait DistanceStore: Send + Sync {
    /// Insert records, ignoring any whose pair id already exists.
    /// Returns the number actually inserted.
    fn bulk_upsert(&self, records: &[DistanceRecord]) -> Result<usize, StoreError>;

    /// Insert one record, ignoring it if the pair id exists.
    fn insert_distance(&self, record: &DistanceRecord) -> Result<usize, StoreError>;

    fn pair_exists(&self, a: &str, b: &str) -> Result<bool, StoreError>;

    /// Cached distance, `None` when the pair is not cached.
    fn get_distance(&self, a: &str, b: &str) -> Result<Option<f64>, StoreError>;

    /// Every cached partner of `uid` with its distance.
    fn pairs_for(&self, uid: &str) -> Result<HashMap<String, f64>, StoreError>;
}

/// Airport entity table.
pub trait AirportStore: Send + Sync {
    /// Insert airports that have a UID, ignoring UIDs already stored.
    /// Returns the number actually inserted.
    fn import_airports(&self, airports: &[Airport]) -> Result<usize, StoreError>;

    fn get_airport(&self, uid: &str) -> Result<Option<Airport>, StoreError>;

    fn count_airports(&self) -> Result<usize, StoreError>;
}

/// A store holding both tables, as the import pipeline needs.
pub trait CacheStore: DistanceStore + AirportStore {}

impl<T: DistanceStore + AirportStore + ?Sized> CacheStore for T {}
