//! Real measurement probe.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use crate::allocator::{thread_alloc_count, thread_bytes_allocated};
use crate::pal::abstractions::MeasurementProbe;

static ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Reads the monotonic clock and the counters maintained by [`Allocator`](crate::Allocator).
#[derive(Clone, Debug)]
pub(crate) struct RealProbe;

impl MeasurementProbe for RealProbe {
    fn elapsed(&self) -> Duration {
        ORIGIN.elapsed()
    }

    // Rust has no garbage collector.
    fn gc_time(&self) -> Duration {
        Duration::ZERO
    }

    fn alloc_count(&self) -> u64 {
        thread_alloc_count()
    }

    fn bytes_allocated(&self) -> u64 {
        thread_bytes_allocated()
    }
}
