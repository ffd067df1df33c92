//! Pairwise distance import pipeline.
//!
//! A run over N airports makes sure every unordered pair has exactly one
//! cached [`DistanceRecord`]:
//!
//! 1. **Scan** each airport's cached pairs and skip it when all N-1 exist.
//! 2. **Enumerate** the missing partners, each pair claimed once per run.
//! 3. **Flush** records to the store in batches (insert-or-ignore).
//! 4. **Validate** by re-counting every airport's pairs and repairing gaps
//!    one record at a time.
//!
//! Re-running over an unchanged dataset inserts nothing. Store failures that
//! exhaust their retries are logged and the run continues degraded; the
//! validation pass fills in what they lost. A fatal store error stops the
//! run with a partial [`ImportReport`].

mod importer;
mod pair;
mod parallel;
mod report;
mod validate;

pub use importer::{DistanceCache, ImportOptions};
pub use pair::{order_uids, DistanceRecord, PairKey};
pub use report::{format_elapsed, ImportReport};

use crate::store::StoreError;

/// Errors that stop a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A fatal store error ended the distance import.
    #[error("distance import aborted ({report}): {source}")]
    Aborted {
        report: ImportReport,
        #[source]
        source: StoreError,
    },

    /// A fatal store error ended the airport import.
    #[error("airport import aborted after {inserted} airport(s): {source}")]
    AirportsAborted {
        inserted: usize,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    /// Partial report of an aborted distance import.
    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            PipelineError::Aborted { report, .. } => Some(report),
            PipelineError::AirportsAborted { .. } => None,
        }
    }
}
