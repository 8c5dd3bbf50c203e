//! Time abstraction for testability.
//!
//! The watcher measures the gap between poll iterations to detect
//! resume-from-standby. Wall-clock time is used on purpose: monotonic clocks
//! stop while the host is suspended on some platforms, which would hide the
//! very gap being looked for.

use std::time::{Duration, SystemTime};

/// Abstraction over system time for testability.
///
/// # Example
///
/// ```
/// use netcfg_watch::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Time elapsed from `earlier` to `later`; zero if the clock went backwards.
#[must_use]
pub fn gap(earlier: SystemTime, later: SystemTime) -> Duration {
    later.duration_since(earlier).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod mock {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, SystemTime};

    /// A mock clock that only moves when advanced.
    #[derive(Debug)]
    pub struct MockClock {
        /// Milliseconds since `UNIX_EPOCH`.
        millis: AtomicU64,
    }

    impl MockClock {
        pub fn new(initial_secs: u64) -> Self {
            Self {
                millis: AtomicU64::new(initial_secs * 1000),
            }
        }

        pub fn advance(&self, by: Duration) {
            let millis = u64::try_from(by.as_millis()).unwrap();
            self.millis.fetch_add(millis, Ordering::SeqCst);
        }

        pub fn rewind(&self, by: Duration) {
            let millis = u64::try_from(by.as_millis()).unwrap();
            self.millis.fetch_sub(millis, Ordering::SeqCst);
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> SystemTime {
            SystemTime::UNIX_EPOCH + Duration::from_millis(self.millis.load(Ordering::SeqCst))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockClock;
    use super::*;

    #[test]
    fn system_clock_returns_current_time() {
        let before = SystemTime::now();
        let result = SystemClock.now();
        let after = SystemTime::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn mock_clock_can_advance() {
        let clock = MockClock::new(1_000);
        let start = clock.now();

        clock.advance(Duration::from_secs(45));

        assert_eq!(gap(start, clock.now()), Duration::from_secs(45));
    }

    #[test]
    fn gap_is_zero_when_clock_goes_backwards() {
        let clock = MockClock::new(1_000);
        let start = clock.now();

        clock.rewind(Duration::from_secs(30));

        assert_eq!(gap(start, clock.now()), Duration::ZERO);
    }

    #[test]
    fn clocks_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemClock>();
        assert_send_sync::<MockClock>();
    }
}
