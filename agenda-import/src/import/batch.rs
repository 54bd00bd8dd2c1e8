//! Batched submission of valid records to the record store
//!
//! Records are chunked into fixed-size batches and submitted strictly one
//! after the other. A failed batch is counted and reported, never retried,
//! and never stops the batches after it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::store::{RecordStore, StoredRecord};

use super::validation::CanonicalRecord;

/// Default number of records per insert call
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Options for one import run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Records per batch; values below 1 are treated as 1
    pub batch_size: usize,
    /// Identity stamped on every stored record
    pub owner_id: String,
}

impl BatchOptions {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            owner_id: owner_id.into(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Progress emitted after every batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportProgress {
    /// 1-based number of the batch that just finished
    pub batch: usize,
    pub total_batches: usize,
    /// Records attempted so far (succeeded or failed)
    pub processed: usize,
    pub total: usize,
    /// processed / total * 100, clamped to [0, 100]
    pub percent: f64,
}

/// Final result of an import run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    pub success_count: usize,
    pub failed_count: usize,
    /// One entry per failed batch, in batch order
    pub errors: Vec<String>,
    /// The run stopped early because cancellation was requested
    pub cancelled: bool,
}

impl ImportOutcome {
    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }
}

/// Cooperative cancellation, honoured between batches
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Percentage of `processed` over `total`, clamped to [0, 100]
pub fn progress_percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (processed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Split records into consecutive batches (the last one may be smaller)
pub fn chunk_records(records: &[CanonicalRecord], batch_size: usize) -> Vec<&[CanonicalRecord]> {
    records.chunks(batch_size.max(1)).collect()
}

/// Submit valid records to the store batch by batch
pub async fn import_records<F>(
    store: &dyn RecordStore,
    records: &[CanonicalRecord],
    options: &BatchOptions,
    cancel: Option<&CancelFlag>,
    mut on_progress: F,
) -> ImportOutcome
where
    F: FnMut(ImportProgress),
{
    let total = records.len();
    let batches = chunk_records(records, options.effective_batch_size());
    let total_batches = batches.len();
    let mut outcome = ImportOutcome::default();
    let mut processed = 0;

    log::info!(
        "Importing {} records in {} batches of up to {} into {}",
        total,
        total_batches,
        options.effective_batch_size(),
        store.describe()
    );

    for (idx, batch) in batches.into_iter().enumerate() {
        let batch_number = idx + 1;

        if cancel.is_some_and(CancelFlag::is_cancelled) {
            log::warn!(
                "Import cancelled before batch {}/{} ({} records not attempted)",
                batch_number,
                total_batches,
                total - processed
            );
            outcome.cancelled = true;
            break;
        }

        let payload: Vec<StoredRecord> = batch
            .iter()
            .map(|r| StoredRecord::from_record(r, &options.owner_id))
            .collect();

        match store.insert_batch(&payload).await {
            Ok(()) => {
                outcome.success_count += batch.len();
                log::debug!(
                    "Batch {}/{} - stored {} records",
                    batch_number,
                    total_batches,
                    batch.len()
                );
            }
            Err(e) => {
                outcome.failed_count += batch.len();
                outcome
                    .errors
                    .push(format!("batch {}/{}: {}", batch_number, total_batches, e));
                log::error!("Batch {}/{} - failed: {}", batch_number, total_batches, e);
            }
        }

        processed += batch.len();
        on_progress(ImportProgress {
            batch: batch_number,
            total_batches,
            processed,
            total,
            percent: progress_percent(processed, total),
        });
    }

    log::info!(
        "Import finished: {} stored, {} failed",
        outcome.success_count,
        outcome.failed_count
    );

    outcome
}
