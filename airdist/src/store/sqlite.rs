//! SQLite query executor.

use std::path::Path;
use std::time::Instant;

use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Transaction};

use super::executor::QueryExecutor;
use super::response::{QueryError, QueryResponse, Row, Value};

/// [`QueryExecutor`] over an embedded SQLite database.
///
/// The connection sits behind a mutex, so statements from concurrent
/// callers are serialised. After [`close`](Self::close) every call fails
/// with [`QueryError::Closed`].
pub struct SqliteExecutor {
    conn: Mutex<Option<Connection>>,
}

impl SqliteExecutor {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "Opened SQLite database");
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Close the connection. Later calls report [`QueryError::Closed`].
    pub fn close(&self) {
        if let Some(conn) = self.conn.lock().take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!(error = %e, "Error while closing SQLite connection");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }

    fn in_transaction<F>(&self, body: F) -> QueryResponse
    where
        F: FnOnce(&Transaction<'_>) -> rusqlite::Result<(Vec<Row>, usize)>,
    {
        let start = Instant::now();
        let mut guard = self.conn.lock();
        let Some(conn) = guard.as_mut() else {
            return QueryResponse::failure(QueryError::Closed, None, start.elapsed());
        };

        let tx = match conn.transaction() {
            Ok(tx) => tx,
            Err(e) => return QueryResponse::failure(failed(e), None, start.elapsed()),
        };

        match body(&tx) {
            Ok((rows, row_count)) => match tx.commit() {
                Ok(()) => QueryResponse::success(rows, row_count, start.elapsed()),
                Err(e) => QueryResponse::failure(failed(e), None, start.elapsed()),
            },
            Err(e) => {
                let rollback_error = tx.rollback().err().map(failed);
                QueryResponse::failure(failed(e), rollback_error, start.elapsed())
            }
        }
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, query: &str, fetch: bool) -> QueryResponse {
        self.in_transaction(|tx| {
            if fetch {
                fetch_rows(tx, query)
            } else {
                tx.execute(query, []).map(|affected| (Vec::new(), affected))
            }
        })
    }

    fn execute_script(&self, script: &str) -> QueryResponse {
        self.in_transaction(|tx| tx.execute_batch(script).map(|()| (Vec::new(), 0)))
    }
}

fn fetch_rows(tx: &Transaction<'_>, query: &str) -> rusqlite::Result<(Vec<Row>, usize)> {
    let mut stmt = tx.prepare(query)?;
    let columns = stmt.column_count();
    let mut cursor = stmt.query([])?;
    let mut rows = Vec::new();
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(columns);
        for i in 0..columns {
            values.push(to_value(row.get_ref(i)?));
        }
        rows.push(values);
    }
    let count = rows.len();
    Ok((rows, count))
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Blob(v.to_vec()),
    }
}

fn failed(e: rusqlite::Error) -> QueryError {
    QueryError::Failed(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor() -> SqliteExecutor {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        let response = executor.execute_script(
            "CREATE TABLE t (k TEXT PRIMARY KEY, v REAL);
             INSERT INTO t VALUES ('a', 1.5), ('b', 2);",
        );
        assert!(!response.failed(), "{:?}", response.error);
        executor
    }

    #[test]
    fn test_fetch_rows() {
        let executor = executor();
        let response = executor.execute("SELECT k, v FROM t ORDER BY k", true);
        assert!(!response.failed());
        assert_eq!(response.row_count, 2);
        assert_eq!(response.rows[0], vec![Value::Text("a".into()), Value::Real(1.5)]);
        assert_eq!(response.rows[1][1].as_f64(), Some(2.0));
    }

    #[test]
    fn test_execute_reports_affected_rows() {
        let executor = executor();
        let response = executor.execute(
            "INSERT INTO t VALUES ('a', 9), ('c', 3) ON CONFLICT(k) DO NOTHING",
            false,
        );
        assert!(!response.failed());
        assert_eq!(response.row_count, 1);
    }

    #[test]
    fn test_error_is_captured_and_rolled_back() {
        let executor = executor();
        let response = executor.execute("INSERT INTO missing VALUES (1)", false);
        assert!(response.failed());
        assert!(matches!(response.error, Some(QueryError::Failed(_))));
        assert!(response.rollback_error.is_none());
    }

    #[test]
    fn test_failed_script_leaves_no_partial_state() {
        let executor = executor();
        let response = executor.execute_script(
            "INSERT INTO t VALUES ('x', 1); INSERT INTO nope VALUES (1);",
        );
        assert!(response.failed());
        let count = executor.execute("SELECT COUNT(*) FROM t", true);
        assert_eq!(count.scalar(), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_closed_executor() {
        let executor = executor();
        executor.close();
        assert!(executor.is_closed());
        let response = executor.execute("SELECT 1", true);
        assert_eq!(response.error, Some(QueryError::Closed));
    }
}
