use std::sync::Arc;

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// The generator subtracts its configured epoch from this value, so a time
/// source never needs to know about epochs. Plug in [`SystemClock`],
/// [`MonotonicClock`], or a mocked clock in tests.
///
/// Implementations should be cheap: the generator polls the clock in a tight
/// loop while waiting for the next millisecond.
///
/// # Example
///
/// ```
/// use snowgen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_735_689_600_042
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1_735_689_600_042);
/// ```
///
/// [`SystemClock`]: crate::SystemClock
/// [`MonotonicClock`]: crate::MonotonicClock
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 00:00:00 UTC.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
