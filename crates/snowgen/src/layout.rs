use crate::config::Configuration;

/// Shift amounts and masks derived from a validated [`Configuration`].
///
/// Field order, most significant first:
///
/// ```text
///  Bit Index:  63   62 ........... ts_shift   ... worker_shift   ...   0
///              +----+-------------------+-----------------+--------------+
///  Field:      | 0  |    timestamp      |    worker id    |   sequence   |
///              +----+-------------------+-----------------+--------------+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    timestamp_shift: u32,
    worker_id_shift: u32,
    max_timestamp: u64,
    max_worker_id: u64,
    max_sequence: u64,
}

impl Layout {
    /// Derives the layout. The configuration must already be validated: bit
    /// widths are positive and sum to at most 63.
    pub(crate) const fn from_config(config: &Configuration) -> Self {
        let ts = config.timestamp_bits as u32;
        let worker = config.worker_id_bits as u32;
        let seq = config.sequence_bits as u32;
        Self {
            timestamp_shift: seq + worker,
            worker_id_shift: seq,
            max_timestamp: (1 << ts) - 1,
            max_worker_id: (1 << worker) - 1,
            max_sequence: (1 << seq) - 1,
        }
    }

    /// Bit offset of the timestamp field.
    pub const fn timestamp_shift(&self) -> u32 {
        self.timestamp_shift
    }

    /// Bit offset of the worker id field.
    pub const fn worker_id_shift(&self) -> u32 {
        self.worker_id_shift
    }

    /// Largest relative timestamp the timestamp field can hold.
    pub const fn max_timestamp(&self) -> u64 {
        self.max_timestamp
    }

    /// Largest worker id the worker id field can hold.
    pub const fn max_worker_id(&self) -> u64 {
        self.max_worker_id
    }

    /// Largest value of the sequence field.
    pub const fn max_sequence(&self) -> u64 {
        self.max_sequence
    }

    /// Worker id field mask, in position.
    pub const fn worker_id_mask(&self) -> u64 {
        self.max_worker_id << self.worker_id_shift
    }

    /// Sequence field mask.
    pub const fn sequence_mask(&self) -> u64 {
        self.max_sequence
    }

    /// Size of the `(timestamp, sequence)` combination space.
    ///
    /// Cannot overflow: the two widths sum to at most 62 bits.
    pub const fn max_combinations(&self) -> u64 {
        (self.max_timestamp + 1) * (self.max_sequence + 1)
    }

    /// Packs the three fields. Values must already be within their maxima.
    #[inline]
    pub const fn pack(&self, timestamp: u64, worker_id: u64, sequence: u64) -> i64 {
        debug_assert!(timestamp <= self.max_timestamp);
        debug_assert!(worker_id <= self.max_worker_id);
        debug_assert!(sequence <= self.max_sequence);
        ((timestamp << self.timestamp_shift) | (worker_id << self.worker_id_shift) | sequence)
            as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_layout() {
        let layout = Layout::from_config(&Configuration::default().with_bits(41, 10, 12));
        assert_eq!(layout.timestamp_shift(), 22);
        assert_eq!(layout.worker_id_shift(), 12);
        assert_eq!(layout.max_timestamp(), (1 << 41) - 1);
        assert_eq!(layout.max_worker_id(), 1023);
        assert_eq!(layout.max_sequence(), 4095);
        assert_eq!(layout.worker_id_mask(), 0x3FF << 12);
        assert_eq!(layout.sequence_mask(), 0xFFF);
    }

    #[test]
    fn pack_keeps_sign_bit_clear_at_maxima() {
        let layout = Layout::from_config(&Configuration::default().with_bits(41, 10, 12));
        let id = layout.pack(
            layout.max_timestamp(),
            layout.max_worker_id(),
            layout.max_sequence(),
        );
        assert_eq!(id, i64::MAX);
    }

    #[test]
    fn pack_places_fields() {
        let layout = Layout::from_config(&Configuration::default().with_bits(10, 4, 6));
        assert_eq!(layout.pack(1, 0, 0), 1 << 10);
        assert_eq!(layout.pack(0, 1, 0), 1 << 6);
        assert_eq!(layout.pack(0, 0, 1), 1);
        assert_eq!(layout.pack(3, 2, 5), (3 << 10) | (2 << 6) | 5);
    }

    #[test]
    fn combination_space_of_tiny_layout() {
        let layout = Layout::from_config(&Configuration::default().with_bits(1, 1, 1));
        assert_eq!(layout.max_combinations(), 4);
    }
}
