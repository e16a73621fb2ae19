//! The canonical record history of a timer.

use parking_lot::{Mutex, MutexGuard};

use crate::Record;

/// Append-only, lock-guarded sequence of records that have been drained from the queue.
///
/// Only reachable through [`synchronize()`](crate::synchronizer::synchronize), which holds the
/// lock for the whole drain-and-append step.
#[derive(Debug, Default)]
pub(crate) struct RecordStore {
    records: Mutex<Vec<Record>>,
}

/// Exclusive access to the store. Reads and appends through one guard are consistent.
#[derive(Debug)]
pub(crate) struct StoreGuard<'a> {
    records: MutexGuard<'a, Vec<Record>>,
}

impl RecordStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Blocks until the lock is available. There is no timeout.
    pub(crate) fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            records: self.records.lock(),
        }
    }
}

impl StoreGuard<'_> {
    /// Extends the history, keeping the order in which the records were drained.
    pub(crate) fn append_range(&mut self, records: Vec<Record>) {
        self.records.extend(records);
    }

    pub(crate) fn read_all(&self) -> Vec<Record> {
        self.records.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
