use core::time::Duration;

use crate::{config::Configuration, error::Result, layout::Layout};

/// The fields of a decoded id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Components {
    /// Absolute time, as a duration since the Unix epoch.
    pub timestamp: Duration,
    /// Worker id field.
    pub worker_id: u64,
    /// Sequence field.
    pub sequence: u64,
}

/// Extracts the fields of ids produced under a given [`Configuration`].
///
/// Stateless and `Copy`; share it freely across threads. No method checks
/// that an id was actually produced under this layout: any 64-bit value,
/// negative ones included, decodes through the same bit arithmetic. Decoding
/// with a configuration that differs from the generator's yields
/// meaningless values rather than an error.
///
/// # Example
/// ```
/// use snowgen::{Configuration, Decoder};
///
/// let config = Configuration::default().with_bits(41, 10, 12);
/// let decoder = Decoder::new(&config).unwrap();
///
/// let id = (1_000 << 22) | (5 << 12) | 7;
/// assert_eq!(decoder.timestamp_millis(id), 1_000);
/// assert_eq!(decoder.worker_id(id), 5);
/// assert_eq!(decoder.sequence(id), 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decoder {
    layout: Layout,
    epoch: Duration,
}

impl Decoder {
    /// Creates a decoder, validating the configuration the same way
    /// [`Generator::new`] does.
    ///
    /// # Errors
    /// Any error of [`Configuration::validate`].
    ///
    /// [`Generator::new`]: crate::Generator::new
    pub fn new(config: &Configuration) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            layout: Layout::from_config(config),
            epoch: config.epoch,
        })
    }

    /// Milliseconds between the configured epoch and the id's timestamp.
    ///
    /// The timestamp field is read with an arithmetic shift and reinterpreted
    /// as unsigned, so negative inputs decode to very large values.
    pub const fn timestamp_millis(&self, id: i64) -> u64 {
        (id >> self.layout.timestamp_shift()) as u64
    }

    /// Absolute time encoded in the id, as a duration since the Unix epoch.
    ///
    /// Not bounds checked: arbitrary inputs may land far outside any
    /// plausible calendar range.
    pub fn timestamp(&self, id: i64) -> Duration {
        self.epoch + Duration::from_millis(self.timestamp_millis(id))
    }

    /// Worker id field of the id.
    pub const fn worker_id(&self, id: i64) -> u64 {
        ((id as u64) & self.layout.worker_id_mask()) >> self.layout.worker_id_shift()
    }

    /// Sequence field of the id.
    pub const fn sequence(&self, id: i64) -> u64 {
        (id as u64) & self.layout.sequence_mask()
    }

    /// All three fields at once.
    pub fn decode(&self, id: i64) -> Components {
        Components {
            timestamp: self.timestamp(id),
            worker_id: self.worker_id(id),
            sequence: self.sequence(id),
        }
    }

    /// Bit layout in use.
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CUSTOM_EPOCH, Generator, TWITTER_EPOCH};

    fn classic() -> Decoder {
        Decoder::new(&Configuration::default().with_epoch(TWITTER_EPOCH)).unwrap()
    }

    #[test]
    fn decodes_each_field() {
        let decoder = classic();
        let id = (123_456_i64 << 22) | (1023 << 12) | 4095;
        assert_eq!(decoder.timestamp_millis(id), 123_456);
        assert_eq!(
            decoder.timestamp(id),
            TWITTER_EPOCH + Duration::from_millis(123_456)
        );
        assert_eq!(decoder.worker_id(id), 1023);
        assert_eq!(decoder.sequence(id), 4095);
    }

    #[test]
    fn zero_decodes_to_epoch() {
        let decoder = classic();
        assert_eq!(
            decoder.decode(0),
            Components {
                timestamp: TWITTER_EPOCH,
                worker_id: 0,
                sequence: 0,
            }
        );
    }

    #[test]
    fn negative_ids_decode_without_error() {
        let decoder = classic();
        assert_eq!(decoder.timestamp_millis(-1), u64::MAX);
        assert_eq!(decoder.worker_id(-1), 1023);
        assert_eq!(decoder.sequence(-1), 4095);
        assert!(decoder.timestamp(i64::MIN) > TWITTER_EPOCH);
    }

    #[test]
    fn decoding_is_idempotent() {
        let decoder = classic();
        for id in [0, 1, 42, i64::MAX, i64::MIN, -17, 0x1234_5678_9ABC] {
            assert_eq!(decoder.decode(id), decoder.decode(id));
        }
    }

    #[test]
    fn round_trips_generated_ids() {
        let config = Configuration::default()
            .with_epoch(CUSTOM_EPOCH)
            .with_bits(41, 10, 12)
            .with_worker_id(517);
        let generator = Generator::new(&config).unwrap();
        let decoder = Decoder::new(&config).unwrap();

        for _ in 0..1_000 {
            let id = generator.next_id().unwrap();
            assert!(id >= 0);
            assert_eq!(decoder.worker_id(id), 517);
            assert!(decoder.sequence(id) <= 4095);
            assert!(decoder.timestamp(id) >= config.epoch);
        }
    }

    #[test]
    fn uses_configured_layout() {
        let decoder = Decoder::new(&Configuration::default().with_bits(20, 3, 5)).unwrap();
        let id = (9 << 8) | (6 << 5) | 17;
        assert_eq!(decoder.timestamp_millis(id), 9);
        assert_eq!(decoder.worker_id(id), 6);
        assert_eq!(decoder.sequence(id), 17);
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(Decoder::new(&Configuration::default().with_bits(42, 10, 12)).is_err());
        assert!(
            Decoder::new(&Configuration::default().with_bits(5, 2, 5).with_worker_id(4)).is_err()
        );
    }
}
