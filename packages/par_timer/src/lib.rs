#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Timing and allocation samples collected from parallel code into one flat table.
//!
//! A [`Timer`] accepts per-call observations from any number of threads in the owning process
//! and from any number of worker processes that were handed a [`RemoteHandle`]. Each completed
//! call produces exactly one [`Record`] with the elapsed time, garbage collection time,
//! allocation count, bytes allocated and the identifiers of the thread and process that ran it.
//!
//! The core functionality includes:
//! - [`Timer`] - Owns the records and exposes the recording, instrumentation and read operations
//! - [`RemoteTimer`] - Producer-only view of a timer, used from worker processes
//! - [`Instrumented`] - A callable bound to a timer and a name
//! - [`Report`] - Human-readable summary of everything recorded so far
//! - [`Columns`] - The column-oriented view consumed by exporters
//! - [`Allocator`] - Opt-in global allocator that feeds the allocation columns
//!
//! # Simple usage
//!
//! ```
//! use std::thread;
//!
//! use par_timer::Timer;
//!
//! let timer = Timer::new();
//!
//! thread::scope(|s| {
//!     for worker in 0..4 {
//!         let timer = &timer;
//!         s.spawn(move || timer.record(format!("worker {worker}"), || worker * 2));
//!     }
//! });
//!
//! // Reading always merges whatever the workers enqueued first.
//! assert_eq!(timer.rows().len(), 4);
//!
//! println!("{timer}");
//! ```
//!
//! # Instrumenting a callable
//!
//! ```
//! use par_timer::{Timer, timed};
//!
//! fn add_one(x: u32) -> u32 {
//!     x + 1
//! }
//!
//! let timer = Timer::new();
//!
//! let add_one = timer.instrument(add_one);
//! assert_eq!(add_one.call(5), 6);
//!
//! let sum = timed!(timer, "sum", (1..=10).sum::<u32>());
//! assert_eq!(sum, 55);
//!
//! assert_eq!(timer.rows().len(), 2);
//! ```
//!
//! # Worker processes
//!
//! The owning process calls [`Timer::remote_handle()`] and passes the handle (it formats to and
//! parses from a plain string) to its workers, for example through an environment variable. Each
//! worker connects with [`RemoteTimer::connect()`] and records as usual. A record whose
//! enqueue returned in the worker is visible to the next read in the owning process.
//!
//! ```
//! use par_timer::{RemoteHandle, RemoteTimer, Timer};
//!
//! # fn main() -> par_timer::Result<()> {
//! let timer = Timer::new();
//! let handle: RemoteHandle = timer.remote_handle()?.to_string().parse()?;
//!
//! // Normally this happens in another process.
//! let remote = RemoteTimer::connect(&handle)?;
//! let value = remote.record("remote_work", || 42)?;
//! assert_eq!(value, 42);
//!
//! assert_eq!(timer.rows().len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Allocation and garbage collection columns
//!
//! Allocation counts and bytes are only captured when [`Allocator`] is installed as the global
//! allocator; otherwise both columns are zero. Rust has no garbage collector, so the `gctime`
//! column is always zero. It is kept for compatibility with consumers of the table layout.

mod allocator;
mod builder;
mod context;
mod error;
mod instrumented;
mod invocation;
mod macros;
mod pal;
mod queue;
mod record;
mod remote;
mod report;
mod store;
mod synchronizer;
mod table;
mod timer;
mod wire;

pub use allocator::Allocator;
pub use builder::TimerBuilder;
pub use context::{current_process_id, current_thread_id};
pub use error::{Error, Result};
pub use instrumented::Instrumented;
pub use record::Record;
pub use remote::{RemoteHandle, RemoteTimer};
pub use report::{Report, format_bytes};
pub use table::{COLUMNS, ColumnType, Columns, Value};
pub use timer::Timer;

pub(crate) use invocation::{measure, try_measure};
pub(crate) use queue::RecordQueue;
pub(crate) use store::RecordStore;
