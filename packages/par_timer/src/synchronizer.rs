//! Moves records from the queue into the store.

use tracing::trace;

use crate::store::StoreGuard;
use crate::{RecordQueue, RecordStore};

/// Drains everything currently in `queue` into `store` and returns the still-held store lock.
///
/// The lock is taken before the first drain and kept until the caller drops the guard, so two
/// threads synchronizing at the same time serialize here: every record is drained by exactly one
/// of them and appended exactly once. Producers are never blocked by this, since they only touch
/// the queue. Calling this with an empty queue does nothing beyond taking the lock.
pub(crate) fn synchronize<'a>(queue: &RecordQueue, store: &'a RecordStore) -> StoreGuard<'a> {
    let mut guard = store.lock();
    let mut moved: usize = 0;

    // Producers may keep pushing while we drain; stop once a pass comes back empty.
    loop {
        let batch = queue.try_drain_all();

        if batch.is_empty() {
            break;
        }

        moved = moved.saturating_add(batch.len());
        guard.append_range(batch);
    }

    trace!(moved, total = guard.len(), "synchronized record queue into store");

    guard
}
