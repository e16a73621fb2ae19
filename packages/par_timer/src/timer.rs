use std::any::type_name;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::pal::ProbeFacade;
use crate::remote::{Listener, RemoteHandle};
use crate::synchronizer::synchronize;
use crate::{
    Columns, Instrumented, Record, RecordQueue, RecordStore, Report, Result, TimerBuilder,
    measure, try_measure,
};

/// Collects one [`Record`] per completed call from any number of threads and worker processes.
///
/// Recording only pushes into a lock-free queue. Reading ([`rows()`](Self::rows),
/// [`columns()`](Self::columns), [`report()`](Self::report)) first merges that queue into the
/// timer's record store under a lock, so every read sees everything whose recording finished
/// before the read started.
///
/// Cloning is cheap and yields another handle to the same timer. The record store lives as long
/// as the last clone.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use std::time::Duration;
///
/// use par_timer::Timer;
///
/// let timer = Timer::new();
///
/// let handles: Vec<_> = (0..3)
///     .map(|i| {
///         let timer = timer.clone();
///         thread::spawn(move || {
///             timer.record(format!("sleep {i}"), || thread::sleep(Duration::from_millis(1)))
///         })
///     })
///     .collect();
///
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(timer.rows().len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Timer {
    inner: Arc<TimerInner>,
}

#[derive(Debug)]
struct TimerInner {
    created: Instant,
    queue: RecordQueue,
    store: RecordStore,
    probe: ProbeFacade,
    bind_address: SocketAddr,

    // Started on first request for a remote handle.
    listener: Mutex<Option<Listener>>,
}

impl Timer {
    /// Creates a new timer with an empty record store.
    #[expect(
        clippy::new_without_default,
        reason = "creation starts the clock, which a Default impl would hide"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring a timer.
    pub fn builder() -> TimerBuilder {
        TimerBuilder::new()
    }

    pub(crate) fn from_parts(bind_address: SocketAddr, probe: ProbeFacade) -> Self {
        Self {
            inner: Arc::new(TimerInner {
                created: Instant::now(),
                queue: RecordQueue::new(),
                store: RecordStore::new(),
                probe,
                bind_address,
                listener: Mutex::new(None),
            }),
        }
    }

    /// Runs `f` once on the calling thread, records it under `name` and returns its value.
    ///
    /// If `f` panics the panic propagates unchanged and nothing is recorded.
    ///
    /// # Examples
    ///
    /// ```
    /// use par_timer::Timer;
    ///
    /// let timer = Timer::new();
    ///
    /// let length = timer.record("measure_length", || "hello".len());
    ///
    /// assert_eq!(length, 5);
    /// assert_eq!(timer.rows()[0].name(), "measure_length");
    /// ```
    pub fn record<R>(&self, name: impl Into<String>, f: impl FnOnce() -> R) -> R {
        let (value, record) = measure(name.into(), &self.inner.probe, f);
        self.inner.queue.enqueue(record);
        value
    }

    /// Runs the fallible `f` once and records it only if it returned `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the error of `f` untouched. Nothing is recorded in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use par_timer::Timer;
    ///
    /// let timer = Timer::new();
    ///
    /// let parsed = timer.try_record("parse", || "not a number".parse::<u32>());
    ///
    /// assert!(parsed.is_err());
    /// assert!(timer.rows().is_empty());
    /// ```
    pub fn try_record<T, E>(
        &self,
        name: impl Into<String>,
        f: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let (value, record) = try_measure(name.into(), &self.inner.probe, f)?;
        self.inner.queue.enqueue(record);
        Ok(value)
    }

    /// Wraps `f` so that every call through the wrapper is recorded.
    ///
    /// The records are named after the type of `f`, which for a function item is its path.
    ///
    /// # Examples
    ///
    /// ```
    /// use par_timer::Timer;
    ///
    /// fn double(x: u64) -> u64 {
    ///     x * 2
    /// }
    ///
    /// let timer = Timer::new();
    /// let double = timer.instrument(double);
    ///
    /// assert_eq!(double.call(21), 42);
    /// assert!(timer.rows()[0].name().ends_with("double"));
    /// ```
    pub fn instrument<F>(&self, f: F) -> Instrumented<F> {
        Instrumented::new(f, self.clone(), type_name::<F>())
    }

    /// Wraps `f` so that every call through the wrapper is recorded under `name`.
    pub fn instrument_named<F>(&self, name: impl Into<String>, f: F) -> Instrumented<F> {
        Instrumented::new(f, self.clone(), name)
    }

    /// Merges every record enqueued so far into the record store.
    ///
    /// Safe to call from several threads at once. Calling it with nothing pending changes
    /// nothing. All read operations do this themselves, so calling it explicitly is only useful
    /// to bound how much merging a later read has to do.
    pub fn synchronize(&self) {
        drop(synchronize(&self.inner.queue, &self.inner.store));
    }

    /// Returns every record collected so far, in merge order.
    ///
    /// Always synchronizes first.
    #[must_use]
    pub fn rows(&self) -> Vec<Record> {
        synchronize(&self.inner.queue, &self.inner.store).read_all()
    }

    /// Returns every record collected so far in column-oriented form.
    ///
    /// Always synchronizes first.
    #[must_use]
    pub fn columns(&self) -> Columns {
        Columns::from_rows(&self.rows())
    }

    /// Number of records collected so far. Synchronizes first.
    #[must_use]
    pub fn len(&self) -> usize {
        synchronize(&self.inner.queue, &self.inner.store).len()
    }

    /// Whether no records have been collected so far. Synchronizes first.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Monotonic time since this timer was created.
    #[must_use]
    pub fn elapsed_since_creation(&self) -> Duration {
        self.inner.created.elapsed()
    }

    /// Takes a synchronized snapshot of the records together with the elapsed time.
    #[must_use]
    pub fn report(&self) -> Report {
        // Clock is read after the rows: every row finished within the reported elapsed time.
        let rows = self.rows();
        Report::new(self.elapsed_since_creation(), rows)
    }

    /// Prints the report to stdout.
    ///
    /// This is a convenience method equivalent to `self.report().print_to_stdout()`.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        self.report().print_to_stdout();
    }

    /// Returns the handle worker processes use to reach this timer.
    ///
    /// The first call starts a listener thread on the configured bind address. Later calls
    /// return the same handle. The listener stops when the last clone of the timer is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the listener cannot be started.
    pub fn remote_handle(&self) -> Result<RemoteHandle> {
        let mut listener = self.inner.listener.lock();

        if let Some(listener) = listener.as_ref() {
            return Ok(listener.handle());
        }

        let started = Listener::start(self.inner.bind_address, self.inner.queue.clone())?;
        let handle = started.handle();
        *listener = Some(started);

        Ok(handle)
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}
