//! Sharded initial pass.
//!
//! Airports are scanned on a rayon pool. Workers claim pairs through a shared
//! `DashSet` and hand records over a bounded channel to one writer thread,
//! which owns the batch. A fatal store error on either side raises the abort
//! flag; workers stop at the next airport and the writer drains the channel,
//! flushing what it can.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, Receiver};

use dashmap::DashSet;
use parking_lot::Mutex;
use rayon::prelude::*;

use super::importer::{BatchWriter, DistanceCache, Entry, Scan};
use super::pair::{DistanceRecord, PairKey};
use super::report::ImportReport;
use crate::store::StoreError;
use crate::{log_debug, log_error, log_warn};

/// Shared state between workers and the writer.
struct Shared {
    abort: AtomicBool,
    fatal: Mutex<Option<StoreError>>,
}

impl Shared {
    fn fail(&self, error: StoreError) {
        self.abort.store(true, Ordering::SeqCst);
        let mut fatal = self.fatal.lock();
        if fatal.is_none() {
            *fatal = Some(error);
        }
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }
}

impl DistanceCache {
    pub(super) fn import_parallel(
        &self,
        entries: &[Entry<'_>],
        expected: usize,
        report: &mut ImportReport,
    ) -> Result<(), StoreError> {
        let workers = self.options.workers;
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("airdist-import-{}", i))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                log_warn!(self.logger, "Cannot start {} workers, importing sequentially: {}", workers, e);
                return self.import_sequential(entries, expected, report);
            }
        };
        log_debug!(self.logger, "Importing with {} workers", workers);

        let seen: DashSet<PairKey> = DashSet::new();
        let skipped = AtomicUsize::new(0);
        let shared = Shared {
            abort: AtomicBool::new(false),
            fatal: Mutex::new(None),
        };
        let (sender, receiver) = sync_channel::<DistanceRecord>(self.batch_size() * 2);

        std::thread::scope(|scope| {
            let writer = scope.spawn(|| self.write_all(receiver, &shared, report));

            pool.install(|| {
                // Err(()) only stops the iteration; the cause is in `shared`.
                let _ = entries.par_iter().try_for_each_with(sender, |sender, entry| {
                    if shared.aborted() {
                        return Err(());
                    }
                    let mut claim = |key: &PairKey| seen.insert(key.clone());
                    match self.scan(entry, entries, expected, &mut claim) {
                        Ok(Scan::Complete) => {
                            skipped.fetch_add(1, Ordering::Relaxed);
                            Ok(())
                        }
                        Ok(Scan::Pending(records)) => records
                            .into_iter()
                            .try_for_each(|record| sender.send(record).map_err(|_| ())),
                        Err(e) => {
                            log_error!(self.logger, "Stopping workers: {}", e);
                            shared.fail(e);
                            Err(())
                        }
                    }
                });
            });

            if let Err(panic) = writer.join() {
                std::panic::resume_unwind(panic);
            }
        });

        report.skipped_complete += skipped.into_inner();
        match shared.fatal.into_inner() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Writer loop: batch everything received until every sender is gone.
    fn write_all(&self, receiver: Receiver<DistanceRecord>, shared: &Shared, report: &mut ImportReport) {
        let mut writer = BatchWriter::new(self.store.as_ref(), self.logger.as_ref(), self.batch_size());
        let mut failed = false;

        for record in receiver {
            if failed {
                writer.discard();
                continue;
            }
            if let Err(e) = writer.push(record) {
                log_error!(self.logger, "Writer stopping: {}", e);
                shared.fail(e);
                failed = true;
            }
        }
        if !failed {
            if let Err(e) = writer.flush() {
                shared.fail(e);
            }
        }
        writer.record_into(report);
    }
}
