//! One observation of one completed call.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One immutable timing and allocation observation for a single completed invocation.
///
/// Records carry no sequence number. The rows of a [`Timer`](crate::Timer) form a multiset
/// whose order across producers is unspecified; sort by whichever field you need.
///
/// The serialized field names match the column names of the tabular view, see
/// [`COLUMNS`](crate::COLUMNS). Deserialization rejects records with negative or non-finite
/// times, GC time above the elapsed time and negative allocation figures.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "RawRecord")]
pub struct Record {
    name: String,

    #[serde(rename = "time")]
    time_seconds: f64,

    #[serde(rename = "gctime")]
    gc_time_seconds: f64,

    #[serde(rename = "n_allocs")]
    alloc_count: i64,

    #[serde(rename = "bytes")]
    bytes_allocated: i64,

    thread_id: i64,

    #[serde(rename = "pid")]
    process_id: i64,
}

/// Wire shape of a [`Record`] before its values are checked.
#[derive(Deserialize)]
struct RawRecord {
    name: String,
    time: f64,
    gctime: f64,
    n_allocs: i64,
    bytes: i64,
    thread_id: i64,
    pid: i64,
}

/// A decoded record whose values cannot come from a real measurement.
#[derive(Debug, Error)]
#[error("record '{name}' is invalid: {problem}")]
pub(crate) struct InvalidRecord {
    name: String,
    problem: &'static str,
}

impl TryFrom<RawRecord> for Record {
    type Error = InvalidRecord;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let problem = if !raw.time.is_finite() || raw.time < 0.0 {
            Some("time must be a finite non-negative number of seconds")
        } else if !raw.gctime.is_finite() || raw.gctime < 0.0 {
            Some("gctime must be a finite non-negative number of seconds")
        } else if raw.gctime > raw.time {
            Some("gctime exceeds time")
        } else if raw.n_allocs < 0 {
            Some("n_allocs is negative")
        } else if raw.bytes < 0 {
            Some("bytes is negative")
        } else {
            None
        };

        if let Some(problem) = problem {
            return Err(InvalidRecord {
                name: raw.name,
                problem,
            });
        }

        Ok(Self {
            name: raw.name,
            time_seconds: raw.time,
            gc_time_seconds: raw.gctime,
            alloc_count: raw.n_allocs,
            bytes_allocated: raw.bytes,
            thread_id: raw.thread_id,
            process_id: raw.pid,
        })
    }
}

impl Record {
    /// Assembles a record from the deltas measured around one invocation.
    pub(crate) fn new(
        name: String,
        elapsed: Duration,
        gc_time: Duration,
        alloc_count: u64,
        bytes_allocated: u64,
        thread_id: i64,
        process_id: i64,
    ) -> Self {
        // GC time is a subset of the elapsed time. Anything else is a probe bug.
        debug_assert!(
            gc_time <= elapsed,
            "gc time {gc_time:?} exceeds elapsed time {elapsed:?} for '{name}'"
        );

        Self {
            name,
            time_seconds: elapsed.as_secs_f64(),
            gc_time_seconds: gc_time.as_secs_f64(),
            alloc_count: i64::try_from(alloc_count)
                .expect("allocation count exceeds i64 - this indicates an unrealistic scenario"),
            bytes_allocated: i64::try_from(bytes_allocated)
                .expect("bytes allocated exceeds i64 - this indicates an unrealistic scenario"),
            thread_id,
            process_id,
        }
    }

    /// The user-supplied name of the recorded call.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Elapsed wall clock time of the call, in seconds.
    #[must_use]
    pub fn time_seconds(&self) -> f64 {
        self.time_seconds
    }

    /// Time the runtime spent collecting garbage during the call, in seconds.
    ///
    /// Always zero in Rust programs.
    #[must_use]
    pub fn gc_time_seconds(&self) -> f64 {
        self.gc_time_seconds
    }

    /// Number of allocations made by the calling thread during the call.
    #[must_use]
    pub fn alloc_count(&self) -> i64 {
        self.alloc_count
    }

    /// Bytes allocated by the calling thread during the call.
    #[must_use]
    pub fn bytes_allocated(&self) -> i64 {
        self.bytes_allocated
    }

    /// Identifier of the thread that ran the call, unique within its process.
    #[must_use]
    pub fn thread_id(&self) -> i64 {
        self.thread_id
    }

    /// Operating system identifier of the process that ran the call.
    #[must_use]
    pub fn process_id(&self) -> i64 {
        self.process_id
    }

    /// Garbage collection time as a percentage of this record's own time.
    ///
    /// A zero-time record reports zero. The value is not clamped, so a measurement anomaly where
    /// the GC time exceeds the elapsed time stays visible as a value above 100.
    #[must_use]
    pub fn gc_percentage(&self) -> f64 {
        if self.time_seconds > 0.0 {
            self.gc_time_seconds / self.time_seconds * 100.0
        } else {
            0.0
        }
    }
}
