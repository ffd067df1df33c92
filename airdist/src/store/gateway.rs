//! SQL gateway: retrying, logging front for a [`QueryExecutor`].
//!
//! The gateway implements [`DistanceStore`](super::DistanceStore) and
//! [`AirportStore`](super::AirportStore) over whatever executor it is given.
//! Every operation goes through [`SqlGateway::run`], which applies the retry
//! policy and turns executor failures into [`StoreError`]s.

use std::sync::Arc;
use std::time::Duration;

use super::executor::QueryExecutor;
use super::response::{QueryError, QueryResponse, RollbackSuffix};
use super::schema::{Schema, DEFAULT_SCHEMA};
use super::StoreError;
use crate::config::RetrySettings;
use crate::log::Logger;
use crate::{log_debug, log_error, log_info, log_trace};

/// How store operations are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per operation, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(settings.max_attempts, settings.delay())
    }
}

/// Store gateway over a query executor.
pub struct SqlGateway {
    executor: Arc<dyn QueryExecutor>,
    pub(super) logger: Arc<dyn Logger>,
    retry: RetryPolicy,
    debug_queries: bool,
}

impl SqlGateway {
    pub fn new(executor: Arc<dyn QueryExecutor>, logger: Arc<dyn Logger>) -> Self {
        Self {
            executor,
            logger,
            retry: RetryPolicy::default(),
            debug_queries: false,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Log the text of every query (except bulk inserts) at debug level.
    pub fn with_debug_queries(mut self, debug_queries: bool) -> Self {
        self.debug_queries = debug_queries;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Create tables and indexes.
    ///
    /// Failure here is fatal: the caller cannot use the store.
    pub fn initialize(&self, schema: &Schema) -> Result<(), StoreError> {
        let script = match schema {
            Schema::Builtin => DEFAULT_SCHEMA.to_string(),
            Schema::Script(path) => {
                std::fs::read_to_string(path).map_err(|source| StoreError::SchemaScript {
                    path: path.clone(),
                    source,
                })?
            }
        };
        log_info!(self.logger, "Initializing store schema");
        self.retrying("schema initialization", &script, true, || {
            self.executor.execute_script(&script)
        })
        .map(|_| ())
        .map_err(|e| match e {
            StoreError::Exhausted { source, .. } => StoreError::SchemaInit(source),
            other => other,
        })
    }

    /// Run one statement with retries.
    pub(super) fn run(
        &self,
        operation: &str,
        query: &str,
        fetch: bool,
    ) -> Result<QueryResponse, StoreError> {
        self.retrying(operation, query, false, || self.executor.execute(query, fetch))
    }

    /// Like [`run`](Self::run) but never logs the query text.
    pub(super) fn run_quiet(
        &self,
        operation: &str,
        query: &str,
        fetch: bool,
    ) -> Result<QueryResponse, StoreError> {
        self.retrying(operation, query, true, || self.executor.execute(query, fetch))
    }

    fn retrying<F>(
        &self,
        operation: &str,
        query: &str,
        quiet: bool,
        attempt_once: F,
    ) -> Result<QueryResponse, StoreError>
    where
        F: Fn() -> QueryResponse,
    {
        let attempts = self.retry.attempts();
        let show_query = self.debug_queries && !quiet;
        let mut elapsed = Duration::ZERO;
        let mut last_failure = (QueryError::Failed("not attempted".to_string()), None);

        for attempt in 1..=attempts {
            if show_query {
                log_debug!(
                    self.logger,
                    "{} attempt ({}/{}) query:\n{}",
                    operation,
                    attempt,
                    attempts,
                    query
                );
            } else {
                log_trace!(self.logger, "{} attempt ({}/{})", operation, attempt, attempts);
            }

            let response = attempt_once();
            elapsed += response.elapsed;

            if !response.failed() {
                log_trace!(
                    self.logger,
                    "{} took {:.1}ms",
                    operation,
                    elapsed.as_secs_f64() * 1000.0
                );
                return Ok(response);
            }

            let error = response
                .error
                .clone()
                .unwrap_or_else(|| QueryError::Failed("transaction was rolled back".to_string()));
            if error == QueryError::Closed {
                log_error!(self.logger, "{} failed: store connection is closed", operation);
                return Err(StoreError::Closed);
            }

            log_error!(
                self.logger,
                "{} failed (attempt {}/{}): {}{}",
                operation,
                attempt,
                attempts,
                error,
                RollbackSuffix(&response.rollback_error)
            );
            last_failure = (error, response.rollback_error);
            if attempt < attempts && !self.retry.delay.is_zero() {
                std::thread::sleep(self.retry.delay);
            }
        }

        let (source, rollback) = last_failure;
        Err(StoreError::Exhausted {
            operation: operation.to_string(),
            attempts,
            source,
            rollback,
        })
    }
}
