/// Outcome of a non-blocking [`Generator::try_poll_id`] call.
///
/// - [`IdGenStatus::Ready`]: an id was generated and committed.
/// - [`IdGenStatus::Pending`]: nothing was committed. The clock is behind the
///   last issued timestamp, or the sequence for the current millisecond is
///   used up. Retry once the clock reaches `yield_until`.
///
/// # Example
///
/// ```
/// use snowgen::{Configuration, Generator, IdGenStatus};
///
/// let generator = Generator::new(&Configuration::default()).unwrap();
/// let id = loop {
///     match generator.try_poll_id().unwrap() {
///         IdGenStatus::Ready { id } => break id,
///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
///     }
/// };
/// assert!(id >= 0);
/// ```
///
/// [`Generator::try_poll_id`]: crate::Generator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique id was generated.
    Ready {
        /// The generated id.
        id: i64,
    },
    /// No id could be generated yet.
    Pending {
        /// The relative timestamp (milliseconds since the configured epoch)
        /// the clock must reach before an id can be issued.
        yield_until: u64,
    },
}
