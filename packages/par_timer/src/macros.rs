/// Evaluates an expression once and records it on a timer.
///
/// `timed!(timer, name, expr)` records under `name`; `timed!(timer, expr)` records under the
/// source text of `expr`. The macro evaluates to the value of `expr`.
///
/// The expression is evaluated inside a closure, so `?` and `return` in it apply to that closure
/// rather than to the surrounding function.
///
/// # Examples
///
/// ```
/// use par_timer::{Timer, timed};
///
/// let timer = Timer::new();
///
/// let total = timed!(timer, "sum", (1..=100).sum::<u32>());
/// let product = timed!(timer, 6 * 7);
///
/// assert_eq!(total, 5050);
/// assert_eq!(product, 42);
///
/// let rows = timer.rows();
/// assert_eq!(rows[0].name(), "sum");
/// assert_eq!(rows[1].name(), "6 * 7");
/// ```
#[macro_export]
macro_rules! timed {
    ($timer:expr, $name:expr, $body:expr) => {
        $crate::Timer::record(&$timer, $name, || $body)
    };
    ($timer:expr, $body:expr) => {
        $crate::Timer::record(&$timer, ::std::stringify!($body), || $body)
    };
}
