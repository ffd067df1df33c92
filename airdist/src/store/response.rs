//! Query results as seen by the gateway.

use std::fmt;
use std::time::Duration;

/// A single column value returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value as `f64`; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// One fetched row, columns in select order.
pub type Row = Vec<Value>;

/// Failure reported by a [`QueryExecutor`](super::QueryExecutor).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The connection was closed; retrying cannot help.
    #[error("connection is closed")]
    Closed,
    /// The statement failed; the message comes from the database.
    #[error("{0}")]
    Failed(String),
}

/// Outcome of one executed statement.
///
/// Executors never return errors directly: failures land in `error`, and a
/// failed rollback after that in `rollback_error`.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    /// Fetched rows (empty unless the statement was run with `fetch`).
    pub rows: Vec<Row>,
    /// Rows fetched, or rows affected for statements run without `fetch`.
    pub row_count: usize,
    pub error: Option<QueryError>,
    pub rollback_error: Option<QueryError>,
    pub elapsed: Duration,
}

impl QueryResponse {
    pub fn success(rows: Vec<Row>, row_count: usize, elapsed: Duration) -> Self {
        Self {
            rows,
            row_count,
            elapsed,
            ..Self::default()
        }
    }

    pub fn failure(error: QueryError, rollback_error: Option<QueryError>, elapsed: Duration) -> Self {
        Self {
            error: Some(error),
            rollback_error,
            elapsed,
            ..Self::default()
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some() || self.rollback_error.is_some()
    }

    /// First column of the first row.
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Renders ", rollback failed: ..." when a rollback error is present.
pub(crate) struct RollbackSuffix<'a>(pub &'a Option<QueryError>);

impl fmt::Display for RollbackSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(e) => write!(f, ", rollback failed: {}", e),
            None => Ok(()),
        }
    }
}
