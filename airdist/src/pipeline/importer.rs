//! Sequential import driver and the batch writer shared with the sharded run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::pair::{DistanceRecord, PairKey};
use super::report::ImportReport;
use super::PipelineError;
use crate::airport::{Airport, DistanceMatrix};
use crate::config::{ImportSettings, DEFAULT_BATCH_SIZE, DEFAULT_VALIDATE, DEFAULT_WORKERS};
use crate::log::Logger;
use crate::store::{CacheStore, StoreError};
use crate::{log_debug, log_error, log_info, log_warn};

/// Tuning for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Records per bulk upsert. Zero is treated as one.
    pub batch_size: usize,
    /// Run the validation and repair pass after the initial import.
    pub validate: bool,
    /// Worker threads. 1 (or 0) runs sequentially.
    pub workers: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            validate: DEFAULT_VALIDATE,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl From<&ImportSettings> for ImportOptions {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            batch_size: settings.batch_size,
            validate: settings.validate,
            workers: settings.workers,
        }
    }
}

/// An airport taken into a run, keyed by its UID.
pub(super) type Entry<'a> = (String, &'a Airport);

/// Outcome of scanning one airport.
pub(super) enum Scan {
    /// Every pair was already cached.
    Complete,
    /// Records still to be written.
    Pending(Vec<DistanceRecord>),
}

/// Resumable, validated import of pairwise airport distances.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use airdist::airport::Airport;
/// use airdist::log::NoOpLogger;
/// use airdist::pipeline::{DistanceCache, ImportOptions};
/// use airdist::store::{Schema, SqlGateway, SqliteExecutor};
///
/// let executor = Arc::new(SqliteExecutor::open_in_memory().unwrap());
/// let store = Arc::new(SqlGateway::new(executor, Arc::new(NoOpLogger)));
/// store.initialize(&Schema::Builtin).unwrap();
///
/// let cache = DistanceCache::new(store, Arc::new(NoOpLogger), ImportOptions::default());
/// let airports = vec![
///     Airport::builder("Sofia", 42.7, 23.4).primary_code("SOF").build(),
///     Airport::builder("Burgas", 42.6, 27.5).primary_code("BOJ").build(),
/// ];
/// assert_eq!(cache.import_pairwise_distances(&airports).unwrap().total_inserted(), 1);
/// assert_eq!(cache.import_pairwise_distances(&airports).unwrap().total_inserted(), 0);
/// ```
pub struct DistanceCache {
    pub(super) store: Arc<dyn CacheStore>,
    pub(super) logger: Arc<dyn Logger>,
    pub(super) options: ImportOptions,
}

impl DistanceCache {
    pub fn new(store: Arc<dyn CacheStore>, logger: Arc<dyn Logger>, options: ImportOptions) -> Self {
        Self {
            store,
            logger,
            options,
        }
    }

    pub fn options(&self) -> ImportOptions {
        self.options
    }

    /// Persist airport rows in `batch_size` chunks, ignoring UIDs already
    /// stored. Returns the number inserted.
    pub fn import_airports(&self, airports: &[Airport]) -> Result<usize, PipelineError> {
        let mut inserted = 0;
        for chunk in airports.chunks(self.batch_size()) {
            match self.store.import_airports(chunk) {
                Ok(n) => inserted += n,
                Err(source) if source.is_fatal() => {
                    return Err(PipelineError::AirportsAborted { inserted, source });
                }
                Err(e) => {
                    log_error!(self.logger, "Skipping {} airports: {}", chunk.len(), e);
                }
            }
        }
        log_info!(self.logger, "Inserted {} new airports", inserted);
        Ok(inserted)
    }

    /// Make sure every pair of UID-bearing airports has a cached distance.
    ///
    /// Airports without a UID are ignored and duplicate UIDs count once.
    pub fn import_pairwise_distances(
        &self,
        airports: &[Airport],
    ) -> Result<ImportReport, PipelineError> {
        let start = Instant::now();
        let entries = self.entries(airports);
        let expected = entries.len().saturating_sub(1);
        let mut report = ImportReport {
            airports: entries.len(),
            ..ImportReport::default()
        };

        log_info!(
            self.logger,
            "Importing distances for {} airports ({} pairs expected per airport)",
            entries.len(),
            expected
        );

        let result = if self.options.workers > 1 {
            self.import_parallel(&entries, expected, &mut report)
        } else {
            self.import_sequential(&entries, expected, &mut report)
        };
        let result = result.and_then(|()| {
            if self.options.validate {
                self.repair(&entries, expected, &mut report)
            } else {
                Ok(())
            }
        });

        report.elapsed = start.elapsed();
        match result {
            Ok(()) => {
                log_info!(self.logger, "Distance import finished: {}", report);
                Ok(report)
            }
            Err(source) => {
                log_error!(self.logger, "Distance import aborted: {} ({})", source, report);
                Err(PipelineError::Aborted { report, source })
            }
        }
    }

    /// Seed the cache from a precomputed matrix.
    ///
    /// Header codes are resolved against `airports`: a code matches an
    /// airport UID, or a primary code shared by no other airport. Cells of
    /// codes that do not resolve are skipped. Each unordered pair is taken
    /// from the first cell that names it; the mirrored cell is ignored.
    pub fn import_matrix(
        &self,
        matrix: &DistanceMatrix,
        airports: &[Airport],
    ) -> Result<ImportReport, PipelineError> {
        let start = Instant::now();
        let uids = matrix_uids(matrix, airports);
        for code in matrix.codes().iter().filter(|c| !uids.contains_key(c.as_str())) {
            log_warn!(self.logger, "Matrix code {} matches no airport, skipping", code);
        }
        let mut report = ImportReport {
            airports: uids.len(),
            ..ImportReport::default()
        };
        let mut seen = HashSet::new();
        let mut writer = BatchWriter::new(self.store.as_ref(), self.logger.as_ref(), self.batch_size());

        let mut result = Ok(());
        for (a, b, km) in matrix.entries() {
            let (Some(a), Some(b)) = (uids.get(a), uids.get(b)) else {
                continue;
            };
            if a == b {
                continue;
            }
            let record = DistanceRecord::new(a, b, km);
            if !seen.insert(record.pair_id.clone()) {
                continue;
            }
            result = writer.push(record);
            if result.is_err() {
                break;
            }
        }
        let result = result.and_then(|()| writer.flush());
        writer.record_into(&mut report);

        report.elapsed = start.elapsed();
        match result {
            Ok(()) => {
                log_info!(self.logger, "Matrix import finished: {}", report);
                Ok(report)
            }
            Err(source) => Err(PipelineError::Aborted { report, source }),
        }
    }

    pub(super) fn batch_size(&self) -> usize {
        self.options.batch_size.max(1)
    }

    /// UID-bearing airports, first occurrence of each UID.
    pub(super) fn entries<'a>(&self, airports: &'a [Airport]) -> Vec<Entry<'a>> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(airports.len());
        for airport in airports {
            let Some(uid) = airport.uid() else {
                log_debug!(self.logger, "Skipping {}: no code", airport.name);
                continue;
            };
            if !seen.insert(uid.clone()) {
                log_warn!(self.logger, "Duplicate airport {} ignored", uid);
                continue;
            }
            entries.push((uid, airport));
        }
        entries
    }

    pub(super) fn import_sequential(
        &self,
        entries: &[Entry<'_>],
        expected: usize,
        report: &mut ImportReport,
    ) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        let mut writer = BatchWriter::new(self.store.as_ref(), self.logger.as_ref(), self.batch_size());

        let mut result = Ok(());
        'airports: for entry in entries {
            match self.scan(entry, entries, expected, &mut |key: &PairKey| seen.insert(key.clone())) {
                Ok(Scan::Complete) => report.skipped_complete += 1,
                Ok(Scan::Pending(records)) => {
                    for record in records {
                        if let Err(e) = writer.push(record) {
                            result = Err(e);
                            break 'airports;
                        }
                    }
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        // The pending batch is flushed even when the scan stopped early.
        let flushed = writer.flush();
        writer.record_into(report);
        result.and(flushed)
    }

    /// Work out which pairs of `entry` still need a record.
    ///
    /// `claim` returns `true` the first time a pair is offered in this run.
    pub(super) fn scan(
        &self,
        entry: &Entry<'_>,
        entries: &[Entry<'_>],
        expected: usize,
        claim: &mut dyn FnMut(&PairKey) -> bool,
    ) -> Result<Scan, StoreError> {
        let (uid, airport) = entry;
        let cached = self.cached_pairs(uid)?;
        if let Some(pairs) = &cached {
            if missing_partners(uid, pairs, entries).next().is_none() {
                log_debug!(self.logger, "Skipping {}: all {} pairs cached", uid, expected);
                return Ok(Scan::Complete);
            }
        }

        let mut records = Vec::new();
        for (other_uid, other) in entries {
            if other_uid == uid {
                continue;
            }
            if cached.as_ref().is_some_and(|pairs| pairs.contains_key(other_uid)) {
                continue;
            }
            if !claim(&PairKey::new(uid, other_uid)) {
                continue;
            }
            if cached.is_none() && self.exists(uid, other_uid)? {
                continue;
            }
            records.push(DistanceRecord::new(uid, other_uid, airport.distance_to(other)));
        }

        log_debug!(self.logger, "{}: {} new pairs", uid, records.len());
        Ok(Scan::Pending(records))
    }

    /// Cached partners of `uid`, or `None` when they could not be fetched.
    fn cached_pairs(&self, uid: &str) -> Result<Option<HashMap<String, f64>>, StoreError> {
        match self.store.pairs_for(uid) {
            Ok(pairs) => Ok(Some(pairs)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log_warn!(self.logger, "Checking pairs of {} one by one: {}", uid, e);
                Ok(None)
            }
        }
    }

    /// Whether a pair is cached; an unknown answer counts as missing.
    fn exists(&self, a: &str, b: &str) -> Result<bool, StoreError> {
        match self.store.pair_exists(a, b) {
            Ok(exists) => Ok(exists),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log_warn!(self.logger, "Assuming {} -> {} is missing: {}", a, b, e);
                Ok(false)
            }
        }
    }
}

/// Map matrix header codes to airport UIDs.
fn matrix_uids<'m>(matrix: &'m DistanceMatrix, airports: &[Airport]) -> HashMap<&'m str, String> {
    let mut by_uid = HashMap::new();
    let mut by_primary: HashMap<String, Option<String>> = HashMap::new();
    for airport in airports {
        let Some(uid) = airport.uid() else { continue };
        if let Some(primary) = airport.primary_code.as_deref() {
            by_primary
                .entry(primary.to_uppercase())
                .and_modify(|found| {
                    if found.as_deref() != Some(uid.as_str()) {
                        *found = None;
                    }
                })
                .or_insert_with(|| Some(uid.clone()));
        }
        by_uid.insert(uid.to_uppercase(), uid);
    }

    let mut uids = HashMap::new();
    for code in matrix.codes() {
        let key = code.to_uppercase();
        let uid = match by_uid.get(&key) {
            Some(uid) => Some(uid.clone()),
            None => by_primary.get(&key).cloned().flatten(),
        };
        if let Some(uid) = uid {
            uids.insert(code.as_str(), uid);
        }
    }
    uids
}

/// Airports of the run that `uid` has no cached pair with.
///
/// Cached partners outside the run neither count towards nor against this.
pub(super) fn missing_partners<'e, 'a>(
    uid: &'e str,
    cached: &'e HashMap<String, f64>,
    entries: &'e [Entry<'a>],
) -> impl Iterator<Item = &'e Entry<'a>> + 'e {
    entries
        .iter()
        .filter(move |(other_uid, _)| other_uid != uid && !cached.contains_key(other_uid))
}

/// Accumulates records and writes them in bulk.
pub(super) struct BatchWriter<'a> {
    store: &'a dyn CacheStore,
    logger: &'a dyn Logger,
    batch_size: usize,
    pending: Vec<DistanceRecord>,
    inserted: usize,
    failed_batches: usize,
    discarded: usize,
}

impl<'a> BatchWriter<'a> {
    pub(super) fn new(store: &'a dyn CacheStore, logger: &'a dyn Logger, batch_size: usize) -> Self {
        Self {
            store,
            logger,
            batch_size,
            pending: Vec::with_capacity(batch_size),
            inserted: 0,
            failed_batches: 0,
            discarded: 0,
        }
    }

    /// Queue a record, flushing when the batch is full.
    pub(super) fn push(&mut self, record: DistanceRecord) -> Result<(), StoreError> {
        self.pending.push(record);
        if self.pending.len() >= self.batch_size {
            self.flush()
        } else {
            Ok(())
        }
    }

    /// Write the pending batch.
    ///
    /// An exhausted batch is logged and dropped; a fatal error counts the
    /// batch as discarded and is returned.
    pub(super) fn flush(&mut self) -> Result<(), StoreError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let result = self.store.bulk_upsert(&self.pending);
        let batch = self.pending.len();
        self.pending.clear();
        match result {
            Ok(n) => {
                self.inserted += n;
                log_debug!(self.logger, "Flushed {} records ({} new)", batch, n);
                Ok(())
            }
            Err(e) if e.is_fatal() => {
                self.discarded += batch;
                Err(e)
            }
            Err(e) => {
                self.failed_batches += 1;
                log_error!(self.logger, "Dropping batch of {} records: {}", batch, e);
                Ok(())
            }
        }
    }

    /// Count a record that was never queued.
    pub(super) fn discard(&mut self) {
        self.discarded += 1;
    }

    pub(super) fn record_into(&self, report: &mut ImportReport) {
        report.inserted += self.inserted;
        report.failed_batches += self.failed_batches;
        report.discarded += self.discarded + self.pending.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::store::{AirportStore, DistanceStore, RetryPolicy, Schema, SqlGateway, SqliteExecutor};

    fn gateway() -> Arc<SqlGateway> {
        let executor = Arc::new(SqliteExecutor::open_in_memory().unwrap());
        let gateway =
            SqlGateway::new(executor, Arc::new(NoOpLogger)).with_retry(RetryPolicy::none());
        gateway.initialize(&Schema::Builtin).unwrap();
        Arc::new(gateway)
    }

    fn airports() -> Vec<Airport> {
        vec![
            Airport::builder("Sofia", 42.7, 23.4).primary_code("SOF").build(),
            Airport::builder("Burgas", 42.6, 27.5).primary_code("BOJ").build(),
            Airport::builder("Heathrow", 51.5, -0.45).primary_code("LHR").build(),
        ]
    }

    fn options(batch_size: usize) -> ImportOptions {
        ImportOptions {
            batch_size,
            ..ImportOptions::default()
        }
    }

    #[test]
    fn test_three_airports_three_records() {
        let store = gateway();
        let cache = DistanceCache::new(store.clone(), Arc::new(NoOpLogger), options(2));

        let report = cache.import_pairwise_distances(&airports()).unwrap();
        assert_eq!(report.airports, 3);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.repaired, 0);
        assert_eq!(store.pairs_for("SOF").unwrap().len(), 2);

        let again = cache.import_pairwise_distances(&airports()).unwrap();
        assert_eq!(again.total_inserted(), 0);
        assert_eq!(again.skipped_complete, 3);
    }

    #[test]
    fn test_codeless_and_duplicate_airports_ignored() {
        let store = gateway();
        let logger = Arc::new(MemoryLogger::new());
        let cache = DistanceCache::new(store, logger.clone(), ImportOptions::default());

        let mut input = airports();
        input.push(Airport::builder("Strip", 10.0, 10.0).build());
        input.push(Airport::builder("Sofia again", 42.7, 23.4).primary_code("SOF").build());

        let report = cache.import_pairwise_distances(&input).unwrap();
        assert_eq!(report.airports, 3);
        assert_eq!(report.inserted, 3);
        assert!(logger.contains(LogLevel::Warn, "Duplicate airport SOF"));
    }

    #[test]
    fn test_new_airport_adds_only_its_pairs() {
        let store = gateway();
        let cache = DistanceCache::new(store, Arc::new(NoOpLogger), ImportOptions::default());
        cache.import_pairwise_distances(&airports()).unwrap();

        let mut more = airports();
        more.push(Airport::builder("Plovdiv", 42.07, 24.85).primary_code("PDV").build());
        let report = cache.import_pairwise_distances(&more).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped_complete, 0);
    }

    #[test]
    fn test_empty_and_single_airport_runs() {
        let store = gateway();
        let cache = DistanceCache::new(store, Arc::new(NoOpLogger), ImportOptions::default());
        assert_eq!(cache.import_pairwise_distances(&[]).unwrap().total_inserted(), 0);

        let input = airports();
        let report = cache.import_pairwise_distances(&input[..1]).unwrap();
        assert_eq!(report.total_inserted(), 0);
        assert_eq!(report.skipped_complete, 1);
    }

    #[test]
    fn test_import_airports_in_chunks() {
        let store = gateway();
        let cache = DistanceCache::new(store.clone(), Arc::new(NoOpLogger), options(2));
        assert_eq!(cache.import_airports(&airports()).unwrap(), 3);
        assert_eq!(cache.import_airports(&airports()).unwrap(), 0);
        assert_eq!(store.count_airports().unwrap(), 3);
    }

    #[test]
    fn test_import_matrix_takes_each_pair_once() {
        let csv = "SOF,BOJ,LHR\n0,335.0,2029.0\n335.0,0,2320.0\n2029.0,2320.0,0\n";
        let matrix = DistanceMatrix::from_reader(csv.as_bytes()).unwrap();
        let store = gateway();
        let cache = DistanceCache::new(store.clone(), Arc::new(NoOpLogger), options(2));

        let report = cache.import_matrix(&matrix, &airports()).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(store.get_distance("LHR", "BOJ").unwrap(), Some(2320.0));
        assert_eq!(cache.import_matrix(&matrix, &airports()).unwrap().inserted, 0);
    }

    #[test]
    fn test_import_matrix_skips_broken_row_without_shifting() {
        let csv = "SOF,BOJ,LHR\n0,far,2029.0\n335.0,0,2320.0\n2029.0,2320.0,0\n";
        let matrix = DistanceMatrix::from_reader(csv.as_bytes()).unwrap();
        let store = gateway();
        let cache = DistanceCache::new(store.clone(), Arc::new(NoOpLogger), options(2));

        let report = cache.import_matrix(&matrix, &airports()).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(store.get_distance("SOF", "BOJ").unwrap(), Some(335.0));
        assert_eq!(store.get_distance("SOF", "LHR").unwrap(), Some(2029.0));
        assert_eq!(store.get_distance("BOJ", "LHR").unwrap(), Some(2320.0));
    }

    #[test]
    fn test_import_matrix_with_extra_rows() {
        let csv = "SOF,BOJ\n0,335.0\n335.0,0\n5,6\n";
        let matrix = DistanceMatrix::from_reader(csv.as_bytes()).unwrap();
        let store = gateway();
        let cache = DistanceCache::new(store.clone(), Arc::new(NoOpLogger), options(2));

        let report = cache.import_matrix(&matrix, &airports()).unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(store.get_distance("SOF", "BOJ").unwrap(), Some(335.0));
    }

    #[test]
    fn test_import_matrix_resolves_codes_to_uids() {
        let input = vec![
            Airport::builder("Heathrow", 51.47, -0.46)
                .primary_code("LHR")
                .secondary_code("EGLL")
                .build(),
            Airport::builder("Sofia", 42.7, 23.4).primary_code("SOF").build(),
            Airport::builder("Gatwick", 51.15, -0.18)
                .primary_code("LGW")
                .secondary_code("EGKK")
                .build(),
            Airport::builder("Gatwick north", 51.16, -0.18)
                .primary_code("LGW")
                .secondary_code("EGKN")
                .build(),
        ];
        let csv = "LHR,sof,LGW,XXX\n0,2029.0,40.0,1\n2029.0,0,2000.0,1\n40.0,2000.0,0,1\n1,1,1,0\n";
        let matrix = DistanceMatrix::from_reader(csv.as_bytes()).unwrap();
        let store = gateway();
        let logger = Arc::new(MemoryLogger::new());
        let cache = DistanceCache::new(store.clone(), logger.clone(), options(2));

        let report = cache.import_matrix(&matrix, &input).unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(store.get_distance("LHR_EGLL", "SOF").unwrap(), Some(2029.0));
        assert!(logger.contains(LogLevel::Warn, "Matrix code LGW matches no airport"));
        assert!(logger.contains(LogLevel::Warn, "Matrix code XXX matches no airport"));
    }

    #[test]
    fn test_pairs_outside_the_run_do_not_complete_an_airport() {
        let store = gateway();
        store
            .bulk_upsert(&[
                DistanceRecord::new("AAA", "CCC", 1.0),
                DistanceRecord::new("BBB", "DDD", 1.0),
            ])
            .unwrap();
        let input = vec![
            Airport::builder("Alpha", 10.0, 10.0).primary_code("AAA").build(),
            Airport::builder("Bravo", 11.0, 11.0).primary_code("BBB").build(),
        ];
        let cache = DistanceCache::new(
            store.clone(),
            Arc::new(NoOpLogger),
            ImportOptions {
                validate: false,
                ..ImportOptions::default()
            },
        );

        let report = cache.import_pairwise_distances(&input).unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped_complete, 0);
        assert!(store.pair_exists("AAA", "BBB").unwrap());
    }

    #[test]
    fn test_batch_writer_flushes_at_batch_size() {
        let store = gateway();
        let mut writer = BatchWriter::new(store.as_ref(), &NoOpLogger, 2);
        writer.push(DistanceRecord::new("A", "B", 1.0)).unwrap();
        assert_eq!(store.pairs_for("A").unwrap().len(), 0);
        writer.push(DistanceRecord::new("A", "C", 2.0)).unwrap();
        assert_eq!(store.pairs_for("A").unwrap().len(), 2);

        let mut report = ImportReport::default();
        writer.record_into(&mut report);
        assert_eq!(report.inserted, 2);
    }
}
