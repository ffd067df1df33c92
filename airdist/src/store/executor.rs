//! Query executor contract.

use super::response::QueryResponse;

/// Runs SQL text against a backing database.
///
/// Every call runs in its own transaction: committed on success, rolled
/// back on failure. Failures are reported inside the [`QueryResponse`]
/// rather than as `Err`, so callers always see timing and rollback outcome.
pub trait QueryExecutor: Send + Sync {
    /// Execute a single statement. With `fetch`, result rows are returned
    /// and `row_count` is the number fetched; otherwise `row_count` is the
    /// number of rows affected.
    fn execute(&self, query: &str, fetch: bool) -> QueryResponse;

    /// Execute a multi-statement script (schema setup).
    fn execute_script(&self, script: &str) -> QueryResponse;
}
