use core::{cmp::Ordering, time::Duration};

use portable_atomic::{AtomicU64, Ordering as AtomicOrdering};
#[cfg(feature = "tracing")]
use tracing::{instrument, warn};

use crate::{
    config::Configuration,
    error::{Error, Result},
    generator::{IdGenStatus, Mutex, MutexGuard},
    layout::Layout,
    time::{SystemClock, TimeSource},
};

/// Busy-poll iterations between thread yields while waiting for the clock.
const SPINS_PER_YIELD: u32 = 64;

#[derive(Debug, Default)]
struct State {
    /// Relative timestamp of the last issued id, `None` before the first.
    last_timestamp: Option<u64>,
    sequence: u64,
    /// Number of fallback ids issued, only advanced once real time no longer
    /// fits in the timestamp field. Modulo the combination count, it is the
    /// `(timestamp, sequence)` index of the last one.
    combination_counter: u64,
    /// Highest `(timestamp, sequence)` index issued from the clock.
    clock_high_water: Option<u64>,
    /// Whether the last fallback id reused part of the clock's range.
    #[cfg(feature = "tracing")]
    reissuing: bool,
}

/// A thread-safe Snowflake-style id generator with a runtime bit layout.
///
/// All state lives behind one mutex, so [`Generator::next_id`] is a strict
/// critical section and calls are totally ordered by lock acquisition. For a
/// single generator, an id returned before another call starts is always
/// smaller than the id that call returns, as long as real time fits in the
/// timestamp field.
///
/// ## Waiting
/// When the clock is behind the last issued timestamp, or the current
/// millisecond's sequence is used up, `next_id` spins *while holding the
/// lock* until the clock moves past that timestamp. There is no timeout:
/// callers needing bounded latency should use [`Generator::try_poll_id`] or
/// wrap the call.
///
/// ## Timestamp field overflow
/// Once more milliseconds have elapsed since the epoch than the timestamp
/// field can hold, the generator stops following the clock and walks a
/// counter over every `(timestamp, sequence)` combination instead, starting
/// at index 1. Counter values the clock already reached, and every value
/// after the counter wraps, **may repeat earlier ids**. These events are
/// logged (`tracing` feature) and counted by
/// [`Generator::overflow_ids`] and [`Generator::recycled_ids`]. Narrow
/// timestamp fields only suit tests or short-lived deployments.
///
/// # Example
/// ```
/// use snowgen::{Configuration, Generator};
///
/// let generator = Generator::new(&Configuration::default().with_worker_id(3)).unwrap();
/// let a = generator.next_id().unwrap();
/// let b = generator.next_id().unwrap();
/// assert!(a < b);
/// ```
#[derive(Debug)]
pub struct Generator<T = SystemClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    clock: T,
    layout: Layout,
    worker_id: u64,
    epoch_millis: u64,
    overflow_ids: AtomicU64,
    recycled_ids: AtomicU64,
}

impl Generator<SystemClock> {
    /// Creates a generator reading the system wall clock.
    ///
    /// # Errors
    /// Any error of [`Configuration::validate`].
    pub fn new(config: &Configuration) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<T> Generator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading time from `clock`.
    ///
    /// The configuration is validated against the clock's current reading,
    /// then its layout is cached; later changes to `config` do not affect
    /// the generator.
    ///
    /// # Errors
    /// Any error of [`Configuration::validate`].
    pub fn with_clock(config: &Configuration, clock: T) -> Result<Self> {
        config.validate_at(Duration::from_millis(clock.current_millis()))?;
        let state = Mutex::new(State::default());
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            clock,
            layout: Layout::from_config(config),
            worker_id: config.worker_id,
            epoch_millis: config.epoch_millis()?,
            overflow_ids: AtomicU64::new(0),
            recycled_ids: AtomicU64::new(0),
        })
    }

    /// Generates the next id, waiting for the clock if needed.
    ///
    /// # Errors
    /// - [`Error::ClockBeforeEpoch`] if the clock reads earlier than the
    ///   configured epoch
    /// - `Error::LockPoisoned` if built without `parking-lot` and another
    ///   thread panicked inside the critical section
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(worker_id = self.worker_id)))]
    pub fn next_id(&self) -> Result<i64> {
        let mut state = self.lock()?;
        let raw = self.relative_millis()?;

        let slot = if raw > self.layout.max_timestamp() {
            None
        } else {
            let last_timestamp = state.last_timestamp;
            match last_timestamp {
                Some(last) => match raw.cmp(&last) {
                    Ordering::Greater => Some((raw, 0)),
                    Ordering::Equal => {
                        let sequence = (state.sequence + 1) & self.layout.max_sequence();
                        if sequence == 0 {
                            self.next_tick(last)
                        } else {
                            Some((raw, sequence))
                        }
                    }
                    Ordering::Less => self.cold_clock_behind(raw, last),
                },
                None => Some((raw, 0)),
            }
        };

        let (timestamp, sequence) = self.commit_slot(&mut state, slot);
        Ok(self.layout.pack(timestamp, self.worker_id, sequence))
    }

    /// Attempts to generate the next id without waiting.
    ///
    /// Behaves like [`Generator::next_id`] except that, where `next_id` would
    /// spin, this returns [`IdGenStatus::Pending`] and commits nothing.
    ///
    /// # Errors
    /// Same as [`Generator::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(worker_id = self.worker_id)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut state = self.lock()?;
        let raw = self.relative_millis()?;

        let slot = if raw > self.layout.max_timestamp() {
            None
        } else {
            let last_timestamp = state.last_timestamp;
            match last_timestamp {
                Some(last) => match raw.cmp(&last) {
                    Ordering::Greater => Some((raw, 0)),
                    Ordering::Equal if state.sequence < self.layout.max_sequence() => {
                        Some((raw, state.sequence + 1))
                    }
                    Ordering::Equal | Ordering::Less => {
                        return Ok(IdGenStatus::Pending {
                            yield_until: last + 1,
                        });
                    }
                },
                None => Some((raw, 0)),
            }
        };

        let (timestamp, sequence) = self.commit_slot(&mut state, slot);
        Ok(IdGenStatus::Ready {
            id: self.layout.pack(timestamp, self.worker_id, sequence),
        })
    }

    /// Worker id encoded in every id.
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Bit layout in use.
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Configured epoch, as a duration since the Unix epoch.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// Number of ids issued from the combination counter because real time
    /// no longer fits in the timestamp field.
    pub fn overflow_ids(&self) -> u64 {
        self.overflow_ids.load(AtomicOrdering::Relaxed)
    }

    /// Number of fallback ids that may duplicate an earlier id: those issued
    /// after the combination space wrapped, and those whose combination the
    /// clock had already reached before the fallback took over.
    ///
    /// Any non-zero value means the layout is too narrow for how long the
    /// generator has been running.
    pub fn recycled_ids(&self) -> u64 {
        self.recycled_ids.load(AtomicOrdering::Relaxed)
    }

    #[cfg(feature = "parking-lot")]
    #[allow(clippy::unnecessary_wraps)]
    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        Ok(self.state.lock())
    }

    #[cfg(not(feature = "parking-lot"))]
    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        Ok(self.state.lock()?)
    }

    fn relative_millis(&self) -> Result<u64> {
        let now_millis = self.clock.current_millis();
        now_millis
            .checked_sub(self.epoch_millis)
            .ok_or(Error::ClockBeforeEpoch {
                now_millis,
                epoch_millis: self.epoch_millis,
            })
    }

    /// Records the slot chosen from the clock, or takes the next fallback
    /// combination when there is none.
    fn commit_slot(&self, state: &mut State, slot: Option<(u64, u64)>) -> (u64, u64) {
        let (timestamp, sequence) = match slot {
            Some((timestamp, sequence)) => {
                let index = timestamp * (self.layout.max_sequence() + 1) + sequence;
                state.clock_high_water = state.clock_high_water.max(Some(index));
                (timestamp, sequence)
            }
            None => self.next_combination(state),
        };
        state.last_timestamp = Some(timestamp);
        state.sequence = sequence;
        (timestamp, sequence)
    }

    /// Waits for a tick after `last` and starts its sequence. `None` if that
    /// tick no longer fits the layout.
    fn next_tick(&self, last: u64) -> Option<(u64, u64)> {
        let timestamp = self.wait_until_after(last);
        (timestamp <= self.layout.max_timestamp()).then_some((timestamp, 0))
    }

    #[cold]
    #[inline(never)]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn cold_clock_behind(&self, raw: u64, last: u64) -> Option<(u64, u64)> {
        #[cfg(feature = "tracing")]
        warn!(
            behind_ms = last - raw,
            last_timestamp = last,
            "clock moved backwards, waiting for it to catch up"
        );
        self.next_tick(last)
    }

    /// Polls the clock until it reads strictly after `last`, relative to the
    /// epoch. A clock reading before the epoch counts as zero.
    fn wait_until_after(&self, last: u64) -> u64 {
        let mut spins = 0u32;
        loop {
            let now = self
                .clock
                .current_millis()
                .saturating_sub(self.epoch_millis);
            if now > last {
                return now;
            }
            spins = spins.wrapping_add(1);
            if spins % SPINS_PER_YIELD == 0 {
                std::thread::yield_now();
            } else {
                core::hint::spin_loop();
            }
        }
    }

    fn next_combination(&self, state: &mut State) -> (u64, u64) {
        let combinations = self.layout.max_combinations();
        state.combination_counter = state.combination_counter.wrapping_add(1);
        let counter = state.combination_counter;

        self.overflow_ids.fetch_add(1, AtomicOrdering::Relaxed);
        #[cfg(feature = "tracing")]
        if counter == 1 {
            warn!(
                max_timestamp = self.layout.max_timestamp(),
                combinations, "timestamp field exhausted, issuing ids from the combination counter"
            );
        }

        let wrapped = counter >= combinations;
        let index = if wrapped { counter % combinations } else { counter };
        let reissued = wrapped || state.clock_high_water.is_some_and(|high| index <= high);

        if reissued {
            self.recycled_ids.fetch_add(1, AtomicOrdering::Relaxed);
            #[cfg(feature = "tracing")]
            if wrapped && index == 0 {
                warn!(
                    wraps = counter / combinations,
                    combinations, "combination space exhausted, ids may repeat from now on"
                );
            } else if !wrapped && !state.reissuing {
                warn!(
                    index,
                    high_water = ?state.clock_high_water,
                    "fallback reached combinations already issued from the clock, ids may repeat"
                );
            }
        }
        #[cfg(feature = "tracing")]
        {
            state.reissuing = reissued;
        }

        let per_tick = self.layout.max_sequence() + 1;
        (index / per_tick, index % per_tick)
    }
}
