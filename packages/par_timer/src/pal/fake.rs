//! Fake measurement probe for testing.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::pal::abstractions::MeasurementProbe;

#[derive(Debug, Default)]
struct FakeProbeState {
    elapsed: Duration,
    gc_time: Duration,
    alloc_count: u64,
    bytes_allocated: u64,
}

/// Probe whose readings are set by the test.
///
/// Clones share their state, so a test can keep one clone and advance the readings while the
/// code under test samples the other.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeProbe {
    state: Arc<Mutex<FakeProbeState>>,
}

impl FakeProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_elapsed(&self, elapsed: Duration) {
        self.state.lock().elapsed = elapsed;
    }

    pub(crate) fn set_gc_time(&self, gc_time: Duration) {
        self.state.lock().gc_time = gc_time;
    }

    /// Moves every reading forward as if one call had cost the given amounts.
    pub(crate) fn advance(&self, elapsed: Duration, alloc_count: u64, bytes_allocated: u64) {
        let mut state = self.state.lock();
        state.elapsed = state.elapsed.saturating_add(elapsed);
        state.alloc_count = state.alloc_count.saturating_add(alloc_count);
        state.bytes_allocated = state.bytes_allocated.saturating_add(bytes_allocated);
    }
}

impl MeasurementProbe for FakeProbe {
    fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    fn gc_time(&self) -> Duration {
        self.state.lock().gc_time
    }

    fn alloc_count(&self) -> u64 {
        self.state.lock().alloc_count
    }

    fn bytes_allocated(&self) -> u64 {
        self.state.lock().bytes_allocated
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_readings() {
        let probe = FakeProbe::new();

        assert_eq!(probe.elapsed(), Duration::ZERO);
        assert_eq!(probe.gc_time(), Duration::ZERO);
        assert_eq!(probe.alloc_count(), 0);
        assert_eq!(probe.bytes_allocated(), 0);
    }

    #[test]
    fn advance_accumulates() {
        let probe = FakeProbe::new();

        probe.advance(Duration::from_millis(10), 1, 100);
        probe.advance(Duration::from_millis(20), 2, 50);

        assert_eq!(probe.elapsed(), Duration::from_millis(30));
        assert_eq!(probe.alloc_count(), 3);
        assert_eq!(probe.bytes_allocated(), 150);
    }

    #[test]
    fn shared_state_between_clones() {
        let probe1 = FakeProbe::new();
        let probe2 = probe1.clone();

        probe1.set_gc_time(Duration::from_millis(7));
        assert_eq!(probe2.gc_time(), Duration::from_millis(7));

        probe2.set_elapsed(Duration::from_secs(3));
        assert_eq!(probe1.elapsed(), Duration::from_secs(3));
    }
}
