use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::TimeSource;

/// The operating system's wall clock.
///
/// Follows every adjustment made to the system time, including steps
/// backwards. The generator tolerates those by waiting until the clock
/// passes the last timestamp it issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    /// Reads `SystemTime::now()`. A clock set before 1970 reads as 0.
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| u64::try_from(since.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CUSTOM_EPOCH;

    #[test]
    fn reads_after_custom_epoch() {
        let now = SystemClock.current_millis();
        assert!(now > CUSTOM_EPOCH.as_millis() as u64);
    }
}
