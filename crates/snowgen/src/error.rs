use core::time::Duration;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors `snowgen` can produce.
///
/// Every variant is fatal to the call that produced it (a constructor or
/// [`Generator::next_id`]) and nothing is retried internally. The caller
/// decides whether to retry, fail the request, or escalate.
///
/// [`Generator::next_id`]: crate::Generator::next_id
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No configuration was supplied where one is required.
    #[error("a configuration is required but none was supplied")]
    NullConfiguration,

    /// The bit layout or a temporal parameter is unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// The worker id does not fit in the configured worker id field.
    #[error("worker id {worker_id} is out of range [0, {max_worker_id}]")]
    WorkerIdOutOfRange {
        /// The rejected worker id.
        worker_id: u64,
        /// The largest worker id the layout can encode.
        max_worker_id: u64,
    },

    /// The epoch lies further in the future than the configured tolerance.
    #[error("epoch is {ahead:?} in the future, more than the allowed {max_skew:?}")]
    EpochTooFarInFuture {
        /// How far the epoch is ahead of the current time.
        ahead: Duration,
        /// The configured `max_future_epoch_skew`.
        max_skew: Duration,
    },

    /// The clock reported a time earlier than the configured epoch.
    #[error("clock reads {now_millis}ms, before the configured epoch at {epoch_millis}ms")]
    ClockBeforeEpoch {
        /// Current clock reading in milliseconds since the Unix epoch.
        now_millis: u64,
        /// Configured epoch in milliseconds since the Unix epoch.
        epoch_millis: u64,
    },

    /// The generator's lock was poisoned by a thread that panicked while
    /// holding it.
    ///
    /// Only reachable with the standard library mutex. `parking_lot` mutexes
    /// do not poison, so the variant is absent when the `parking-lot` feature
    /// is enabled.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
