use core::time::Duration;
use std::{
    io,
    sync::{Arc, Weak},
    thread,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use portable_atomic::{AtomicU64, Ordering};

use crate::time::TimeSource;

#[derive(Debug)]
struct Ticker {
    elapsed: AtomicU64,
}

/// A wall-clock-anchored time source that never goes backward.
///
/// At construction the clock samples `SystemTime::now()` once. From then on
/// it reports that anchor plus the monotonic time elapsed since, so NTP steps
/// or manual changes to the system time do not move it.
///
/// A background thread advances a shared counter once per millisecond, which
/// keeps reads to a single atomic load. Clones share the ticker; the thread
/// exits after the last clone is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    ticker: Arc<Ticker>,
    anchor_millis: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a new clock anchored at the current wall-clock time.
    ///
    /// # Panics
    /// Panics if the ticker thread cannot be spawned. Use
    /// [`MonotonicClock::try_new`] to handle that case.
    pub fn new() -> Self {
        Self::try_new().expect("failed to spawn the monotonic clock ticker")
    }

    /// Starts a new clock anchored at the current wall-clock time.
    ///
    /// # Errors
    /// Returns the spawn error if the ticker thread cannot be started. Without
    /// it the clock would never advance.
    pub fn try_new() -> io::Result<Self> {
        let start = Instant::now();
        let anchor_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| since.as_millis() as u64);

        let ticker = Arc::new(Ticker {
            elapsed: AtomicU64::new(0),
        });
        let weak = Arc::downgrade(&ticker);
        thread::Builder::new()
            .name("snowgen-ticker".into())
            .spawn(move || tick(&weak, start))?;

        Ok(Self {
            ticker,
            anchor_millis,
        })
    }
}

fn tick(ticker: &Weak<Ticker>, start: Instant) {
    let mut next = 0u64;
    loop {
        let target = start + Duration::from_millis(next);
        let now = Instant::now();
        if now < target {
            thread::sleep(target - now);
        }

        let Some(ticker) = ticker.upgrade() else {
            break;
        };
        let elapsed = start.elapsed().as_millis() as u64;
        ticker.elapsed.store(elapsed, Ordering::Release);
        next = elapsed + 1;
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.anchor_millis + self.ticker.elapsed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backward() {
        let clock = MonotonicClock::new();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn advances_with_real_time() {
        let clock = MonotonicClock::new();
        let before = clock.current_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_millis() > before);
    }

    #[test]
    fn try_new_starts_a_ticking_clock() {
        let clock = MonotonicClock::try_new().unwrap();
        let before = clock.current_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_millis() > before);
    }

    #[test]
    fn clones_share_the_ticker() {
        let clock = MonotonicClock::new();
        let clone = clock.clone();
        assert!(Arc::ptr_eq(&clock.ticker, &clone.ticker));
        drop(clock);
        thread::sleep(Duration::from_millis(5));
        assert!(clone.current_millis() >= clone.anchor_millis);
    }
}
