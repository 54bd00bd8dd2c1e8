//! In-process record store

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{RecordStore, StoreError, StoredRecord};

/// Keeps inserted records in memory
///
/// Batches are numbered from 1 in call order; numbers listed in
/// `reject_batches` fail with `StoreError::Rejected` and store nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredRecord>>,
    batch_sizes: Mutex<Vec<usize>>,
    reject_batches: HashSet<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the given 1-based batch numbers
    pub fn rejecting(batches: impl IntoIterator<Item = usize>) -> Self {
        Self {
            reject_batches: batches.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<StoredRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Size of every insert call received, including rejected ones
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_batch(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        let batch_number = {
            let mut sizes = self
                .batch_sizes
                .lock()
                .map_err(|e| StoreError::Database(e.to_string()))?;
            sizes.push(records.len());
            sizes.len()
        };

        if self.reject_batches.contains(&batch_number) {
            return Err(StoreError::Rejected(format!(
                "batch {} refused by memory store",
                batch_number
            )));
        }

        self.records
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?
            .extend_from_slice(records);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
