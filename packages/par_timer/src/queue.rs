//! In-process side of the queue that every producer of a timer pushes into.

use std::sync::Arc;

use crossbeam::queue::SegQueue;

use crate::Record;

/// Unbounded multi-producer queue of records waiting to be merged into the record store.
///
/// Cloning yields another handle to the same queue. Local threads push directly; records from
/// worker processes are pushed by the remote listener on their behalf.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordQueue {
    records: Arc<SegQueue<Record>>,
}

impl RecordQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Never blocks and never rejects. Running out of memory aborts the process.
    pub(crate) fn enqueue(&self, record: Record) {
        self.records.push(record);
    }

    /// Removes and returns every record available at the time of the call.
    ///
    /// Returns an empty vector immediately if there is nothing to take. Each record is handed
    /// to exactly one caller, even with several callers draining at once.
    pub(crate) fn try_drain_all(&self) -> Vec<Record> {
        let mut drained = Vec::with_capacity(self.records.len());

        while let Some(record) = self.records.pop() {
            drained.push(record);
        }

        drained
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
