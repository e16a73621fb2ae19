use std::sync::Arc;

use crate::Timer;

/// A callable bound to a [`Timer`] and a name. Every call through it produces one record.
///
/// Created by [`Timer::instrument()`] or [`Timer::instrument_named()`]. The wrapper is cheap to
/// clone and can be moved to other threads if the wrapped callable can.
///
/// # Examples
///
/// ```
/// use par_timer::Timer;
///
/// let timer = Timer::new();
/// let area = timer.instrument_named("area", |(w, h): (u32, u32)| w * h);
///
/// assert_eq!(area.call((3, 4)), 12);
/// assert_eq!(area.call((5, 5)), 25);
///
/// let rows = timer.rows();
/// assert_eq!(rows.len(), 2);
/// assert!(rows.iter().all(|r| r.name() == "area"));
/// ```
#[derive(Clone, Debug)]
pub struct Instrumented<F> {
    underlying: F,
    timer: Timer,
    name: Arc<str>,
}

impl<F> Instrumented<F> {
    pub(crate) fn new(underlying: F, timer: Timer, name: impl Into<String>) -> Self {
        Self {
            underlying,
            timer,
            name: Arc::from(name.into()),
        }
    }

    /// The name every record of this wrapper carries.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the wrapped single-argument callable and records the call.
    pub fn call<A, R>(&self, arg: A) -> R
    where
        F: Fn(A) -> R,
    {
        self.timer.record(&*self.name, || (self.underlying)(arg))
    }

    /// Calls the wrapped callable in whatever way `body` does and records that as one call.
    ///
    /// Use this for callables that do not take exactly one argument.
    ///
    /// ```
    /// use par_timer::Timer;
    ///
    /// fn hypot(a: f64, b: f64) -> f64 {
    ///     a.hypot(b)
    /// }
    ///
    /// let timer = Timer::new();
    /// let hypot = timer.instrument(hypot);
    ///
    /// let c = hypot.invoke(|f| f(3.0, 4.0));
    /// assert!((c - 5.0).abs() < 1e-9);
    /// ```
    pub fn invoke<R>(&self, body: impl FnOnce(&F) -> R) -> R {
        self.timer.record(&*self.name, || body(&self.underlying))
    }

    /// Returns the wrapped callable, detaching it from the timer.
    pub fn into_inner(self) -> F {
        self.underlying
    }
}
