use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::{
    error::{Error, Result},
    time::{SystemClock, TimeSource},
};

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// Instagram epoch: Saturday, January 1, 2011 00:00:00 UTC
pub const INSTAGRAM_EPOCH: Duration = Duration::from_millis(1_293_840_000_000);

/// Standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_EPOCH: Duration = Duration::ZERO;

/// Highest bit an identifier may use. Bit 63 is the sign bit and always zero.
pub const MAX_TOTAL_BITS: u32 = 63;

/// Bit layout and temporal parameters shared by [`Generator`] and
/// [`Decoder`].
///
/// A generator and the decoder reading its ids must be built from
/// configurations with identical bit widths and epoch. Nothing cross-checks
/// the two: decoding with a mismatched configuration silently returns
/// meaningless values.
///
/// Constructors validate the configuration and cache what they derive from
/// it, so changing a `Configuration` afterwards has no effect on instances
/// already built from it.
///
/// # Example
/// ```
/// use snowgen::{Configuration, Generator, Decoder, TWITTER_EPOCH};
///
/// let config = Configuration::default()
///     .with_epoch(TWITTER_EPOCH)
///     .with_worker_id(7);
///
/// let generator = Generator::new(&config).unwrap();
/// let decoder = Decoder::new(&config).unwrap();
///
/// let id = generator.next_id().unwrap();
/// assert_eq!(decoder.worker_id(id), 7);
/// ```
///
/// [`Generator`]: crate::Generator
/// [`Decoder`]: crate::Decoder
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Configuration {
    /// Reference instant, as a duration since 1970-01-01 00:00:00 UTC.
    pub epoch: Duration,
    /// Width of the timestamp field.
    pub timestamp_bits: u8,
    /// Width of the worker id field.
    pub worker_id_bits: u8,
    /// Width of the sequence field.
    pub sequence_bits: u8,
    /// Identifies the producing instance. Must be distinct across every
    /// generator running concurrently against the same id space; this crate
    /// does not enforce that.
    pub worker_id: u64,
    /// How far `epoch` may lie in the future at validation time.
    pub max_future_epoch_skew: Duration,
}

impl Default for Configuration {
    /// The classic 41/10/12 layout anchored at [`CUSTOM_EPOCH`], worker id 0
    /// and a 5 second tolerance for a future epoch.
    fn default() -> Self {
        Self {
            epoch: CUSTOM_EPOCH,
            timestamp_bits: 41,
            worker_id_bits: 10,
            sequence_bits: 12,
            worker_id: 0,
            max_future_epoch_skew: Duration::from_secs(5),
        }
    }
}

impl Configuration {
    /// Sets the epoch.
    #[must_use]
    pub const fn with_epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    /// Sets the three field widths, most significant first.
    #[must_use]
    pub const fn with_bits(mut self, timestamp_bits: u8, worker_id_bits: u8, sequence_bits: u8) -> Self {
        self.timestamp_bits = timestamp_bits;
        self.worker_id_bits = worker_id_bits;
        self.sequence_bits = sequence_bits;
        self
    }

    /// Sets the worker id.
    #[must_use]
    pub const fn with_worker_id(mut self, worker_id: u64) -> Self {
        self.worker_id = worker_id;
        self
    }

    /// Sets the future epoch tolerance.
    #[must_use]
    pub const fn with_max_future_epoch_skew(mut self, skew: Duration) -> Self {
        self.max_future_epoch_skew = skew;
        self
    }

    /// Checks the configuration against the current wall-clock time.
    ///
    /// The epoch check depends on the time of the call, so a configuration
    /// that validates now may fail later (or the other way round).
    ///
    /// # Errors
    /// - [`Error::InvalidConfiguration`] if a field width is zero, the widths
    ///   sum to more than 63, or the epoch does not fit in 64-bit
    ///   milliseconds
    /// - [`Error::WorkerIdOutOfRange`] if `worker_id` exceeds
    ///   `2^worker_id_bits - 1`
    /// - [`Error::EpochTooFarInFuture`] if `epoch - now` exceeds
    ///   `max_future_epoch_skew`
    pub fn validate(&self) -> Result<()> {
        self.validate_at(Duration::from_millis(SystemClock.current_millis()))
    }

    /// Same as [`Configuration::validate`] with an explicit "now", given as a
    /// duration since the Unix epoch.
    ///
    /// # Errors
    /// See [`Configuration::validate`].
    pub fn validate_at(&self, now: Duration) -> Result<()> {
        let result = self.check(now);
        #[cfg(feature = "tracing")]
        if let Err(ref e) = result {
            debug!(error = %e, config = ?self, "configuration rejected");
        }
        result
    }

    fn check(&self, now: Duration) -> Result<()> {
        if self.timestamp_bits == 0 || self.worker_id_bits == 0 || self.sequence_bits == 0 {
            return Err(Error::invalid(format!(
                "bit widths must be positive (timestamp={}, worker_id={}, sequence={})",
                self.timestamp_bits, self.worker_id_bits, self.sequence_bits
            )));
        }

        let total = self.total_bits();
        if total > MAX_TOTAL_BITS {
            return Err(Error::invalid(format!(
                "bit widths sum to {total}, more than {MAX_TOTAL_BITS}"
            )));
        }

        let max_worker_id = (1u64 << self.worker_id_bits) - 1;
        if self.worker_id > max_worker_id {
            return Err(Error::WorkerIdOutOfRange {
                worker_id: self.worker_id,
                max_worker_id,
            });
        }

        self.epoch_millis()?;

        match self.epoch.checked_sub(now) {
            Some(ahead) if ahead > self.max_future_epoch_skew => Err(Error::EpochTooFarInFuture {
                ahead,
                max_skew: self.max_future_epoch_skew,
            }),
            _ => Ok(()),
        }
    }

    /// Sum of the three field widths.
    pub const fn total_bits(&self) -> u32 {
        self.timestamp_bits as u32 + self.worker_id_bits as u32 + self.sequence_bits as u32
    }

    pub(crate) fn epoch_millis(&self) -> Result<u64> {
        u64::try_from(self.epoch.as_millis())
            .map_err(|_| Error::invalid("epoch does not fit in 64-bit milliseconds"))
    }
}
