//! Identifiers of the execution context that ran a recorded call.

use std::cell::Cell;
use std::process;
use std::sync::atomic::{self, AtomicI64};

// 0 is never handed out, so it marks "not yet assigned" in the thread-local slot.
static NEXT_THREAD_ID: AtomicI64 = AtomicI64::new(1);

thread_local! {
    static THREAD_ID: Cell<i64> = const { Cell::new(0) };
}

/// Returns a small integer identifying the current thread.
///
/// Identifiers are assigned on first use, starting from 1, and are never reused within a
/// process. They are only meaningful together with [`current_process_id()`].
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use par_timer::current_thread_id;
///
/// let here = current_thread_id();
/// let there = thread::spawn(current_thread_id).join().unwrap();
///
/// assert_ne!(here, there);
/// assert_eq!(here, current_thread_id());
/// ```
#[must_use]
pub fn current_thread_id() -> i64 {
    THREAD_ID.with(|id| {
        if id.get() == 0 {
            // Relaxed is sufficient: we only need each value to be handed out once.
            id.set(NEXT_THREAD_ID.fetch_add(1, atomic::Ordering::Relaxed));
        }

        id.get()
    })
}

/// Returns the operating system identifier of the current process.
#[must_use]
pub fn current_process_id() -> i64 {
    i64::from(process::id())
}
