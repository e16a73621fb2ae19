//! Runs one call and measures what it cost.

use std::time::Duration;

use crate::pal::MeasurementProbe;
use crate::{Record, current_process_id, current_thread_id};

/// Readings taken right before the call starts.
#[derive(Debug)]
struct Baseline {
    elapsed: Duration,
    gc_time: Duration,
    alloc_count: u64,
    bytes_allocated: u64,
}

impl Baseline {
    fn sample(probe: &impl MeasurementProbe) -> Self {
        Self {
            elapsed: probe.elapsed(),
            gc_time: probe.gc_time(),
            alloc_count: probe.alloc_count(),
            bytes_allocated: probe.bytes_allocated(),
        }
    }

    fn into_record(self, name: String, probe: &impl MeasurementProbe) -> Record {
        // Read the clock first so the bookkeeping below is not billed to the call.
        let elapsed = probe.elapsed().saturating_sub(self.elapsed);
        let gc_time = probe.gc_time().saturating_sub(self.gc_time);
        let alloc_count = probe.alloc_count().wrapping_sub(self.alloc_count);
        let bytes_allocated = probe.bytes_allocated().wrapping_sub(self.bytes_allocated);

        Record::new(
            name,
            elapsed,
            gc_time,
            alloc_count,
            bytes_allocated,
            current_thread_id(),
            current_process_id(),
        )
    }
}

/// Runs `f` exactly once on the calling thread and measures it.
///
/// A panic in `f` unwinds straight through; no record exists for a call that did not complete.
pub(crate) fn measure<R>(
    name: String,
    probe: &impl MeasurementProbe,
    f: impl FnOnce() -> R,
) -> (R, Record) {
    let baseline = Baseline::sample(probe);
    let value = f();
    let record = baseline.into_record(name, probe);

    (value, record)
}

/// Like [`measure()`] but for fallible calls. An `Err` is handed back untouched and produces no
/// record.
pub(crate) fn try_measure<T, E>(
    name: String,
    probe: &impl MeasurementProbe,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<(T, Record), E> {
    let baseline = Baseline::sample(probe);
    let value = f()?;
    let record = baseline.into_record(name, probe);

    Ok((value, record))
}
