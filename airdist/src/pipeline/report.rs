//! Import outcome summary.

use std::fmt;
use std::time::Duration;

/// Counts collected over one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Airports with a UID taken into the run.
    pub airports: usize,
    /// Airports whose pairs were already all cached.
    pub skipped_complete: usize,
    /// Records inserted by the initial pass.
    pub inserted: usize,
    /// Records inserted by the validation pass.
    pub repaired: usize,
    /// Bulk upserts that exhausted their retries.
    pub failed_batches: usize,
    /// Pending records dropped when the run aborted.
    pub discarded: usize,
    pub elapsed: Duration,
}

impl ImportReport {
    /// Newly inserted records across both passes.
    pub fn total_inserted(&self) -> usize {
        self.inserted + self.repaired
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} airports ({} already complete), {} inserted, {} repaired in {}",
            self.airports,
            self.skipped_complete,
            self.inserted,
            self.repaired,
            format_elapsed(self.elapsed)
        )?;
        if self.failed_batches > 0 {
            write!(f, ", {} failed batches", self.failed_batches)?;
        }
        if self.discarded > 0 {
            write!(f, ", {} records discarded", self.discarded)?;
        }
        Ok(())
    }
}

/// Format a duration compactly: "350ms", "5s", "2m30s", "1h15m".
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    }
}
