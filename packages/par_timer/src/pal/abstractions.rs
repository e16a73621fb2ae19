//! Measurement probe trait definition.

use std::fmt::Debug;
use std::time::Duration;

/// Cumulative readings sampled before and after a timed call.
///
/// Every reading only ever grows on a given thread, so the difference between two samples
/// taken on the same thread is what the call in between cost.
pub(crate) trait MeasurementProbe: Debug + Send + Sync + 'static {
    /// Monotonic wall clock time since an arbitrary fixed origin.
    fn elapsed(&self) -> Duration;

    /// Time the runtime has spent collecting garbage.
    ///
    /// Platforms without a garbage collector report zero.
    fn gc_time(&self) -> Duration;

    /// Number of allocations made by the current thread.
    fn alloc_count(&self) -> u64;

    /// Bytes allocated by the current thread.
    fn bytes_allocated(&self) -> u64;
}
