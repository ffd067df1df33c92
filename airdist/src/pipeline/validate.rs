//! Validation pass: re-count each airport's pairs and fill gaps.

use std::time::Instant;

use super::importer::{missing_partners, DistanceCache, Entry};
use super::pair::DistanceRecord;
use super::report::ImportReport;
use super::PipelineError;
use crate::airport::Airport;
use crate::store::StoreError;
use crate::{log_debug, log_error, log_info, log_warn};

impl DistanceCache {
    /// Run only the validation pass over an existing cache.
    pub fn validate(&self, airports: &[Airport]) -> Result<ImportReport, PipelineError> {
        let start = Instant::now();
        let entries = self.entries(airports);
        let expected = entries.len().saturating_sub(1);
        let mut report = ImportReport {
            airports: entries.len(),
            ..ImportReport::default()
        };
        let result = self.repair(&entries, expected, &mut report);
        report.elapsed = start.elapsed();
        match result {
            Ok(()) => Ok(report),
            Err(source) => Err(PipelineError::Aborted { report, source }),
        }
    }

    /// Repair airports missing a cached pair with any other airport of the
    /// run by inserting the missing records one at a time.
    pub(super) fn repair(
        &self,
        entries: &[Entry<'_>],
        expected: usize,
        report: &mut ImportReport,
    ) -> Result<(), StoreError> {
        log_info!(self.logger, "Validating distances for {} airports", entries.len());
        let mut short = 0;

        for (uid, airport) in entries {
            let pairs = match self.store.pairs_for(uid) {
                Ok(pairs) => pairs,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log_error!(self.logger, "Cannot validate {}: {}", uid, e);
                    continue;
                }
            };

            if pairs.len() > expected {
                log_warn!(
                    self.logger,
                    "Found {} pairs for {} (expected {})",
                    pairs.len(),
                    uid,
                    expected
                );
            }
            let missing: Vec<_> = missing_partners(uid, &pairs, entries).collect();
            if missing.is_empty() {
                continue;
            }

            short += 1;
            log_warn!(
                self.logger,
                "Found {} pairs for {} (expected {}), repairing {} missing",
                pairs.len(),
                uid,
                expected,
                missing.len()
            );

            let mut unrepaired = 0;
            for (other_uid, other) in missing {
                match self.store.get_distance(uid, other_uid) {
                    Ok(Some(_)) => continue,
                    Ok(None) => {}
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        log_error!(self.logger, "Cannot check {} -> {}: {}", uid, other_uid, e);
                        unrepaired += 1;
                        continue;
                    }
                }

                let record = DistanceRecord::new(uid, other_uid, airport.distance_to(other));
                match self.store.insert_distance(&record) {
                    Ok(1) => report.repaired += 1,
                    Ok(n) => {
                        log_warn!(
                            self.logger,
                            "Expected rowcount 1 inserting {}, got {}",
                            record.pair_id,
                            n
                        );
                        unrepaired += 1;
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        log_error!(self.logger, "Cannot repair {}: {}", record.pair_id, e);
                        unrepaired += 1;
                    }
                }
            }

            if unrepaired > 0 {
                log_warn!(
                    self.logger,
                    "{} still misses {} pairs after repair",
                    uid,
                    unrepaired
                );
            }
        }

        log_debug!(
            self.logger,
            "Validation done: {} airports short, {} records repaired",
            short,
            report.repaired
        );
        Ok(())
    }
}
