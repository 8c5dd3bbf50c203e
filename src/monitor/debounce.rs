//! Delay policy for "up" events.

use std::time::Duration;

/// Policy for delaying events that announce new connectivity.
///
/// Operating systems often report an address before it is usable (DNS not
/// yet configured, routes still settling). Up events are therefore held
/// back by one of two delays, never both:
///
/// | `up_event_delay` | Behaviour |
/// |------------------|-----------|
/// | non-zero | The watcher sleeps this long before emitting any up event |
/// | zero | The first up event of the batch is queued with `settle_delay` |
///
/// The settle delay is applied by the dispatcher, so it delays the whole
/// batch behind it without blocking the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpEventPolicy {
    up_event_delay: Duration,
    settle_delay: Duration,
}

impl UpEventPolicy {
    /// Creates a policy with the given debounce and settle delays.
    #[must_use]
    pub const fn new(up_event_delay: Duration, settle_delay: Duration) -> Self {
        Self {
            up_event_delay,
            settle_delay,
        }
    }

    /// Sets the debounce the watcher sleeps before emitting up events.
    #[must_use]
    pub const fn with_up_event_delay(mut self, delay: Duration) -> Self {
        self.up_event_delay = delay;
        self
    }

    /// Sets the dispatcher-side settle delay.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// The watcher-side debounce, if one is configured.
    #[must_use]
    pub const fn debounce(&self) -> Option<Duration> {
        if self.up_event_delay.is_zero() {
            None
        } else {
            Some(self.up_event_delay)
        }
    }

    /// Delay to attach to the up event at `position` in its batch.
    ///
    /// Only the first event carries the settle delay, and only when the
    /// watcher did not already debounce.
    #[must_use]
    pub const fn delay_for(&self, position: usize, debounced: bool) -> Duration {
        if debounced || position > 0 {
            Duration::ZERO
        } else {
            self.settle_delay
        }
    }
}

impl Default for UpEventPolicy {
    /// No debounce and a 500 ms settle delay.
    fn default() -> Self {
        Self {
            up_event_delay: Duration::ZERO,
            settle_delay: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_debounce_and_half_second_settle() {
        let policy = UpEventPolicy::default();

        assert_eq!(policy.debounce(), None);
        assert_eq!(policy.delay_for(0, false), Duration::from_millis(500));
    }

    #[test]
    fn only_first_event_carries_settle_delay() {
        let policy = UpEventPolicy::default();

        assert_eq!(policy.delay_for(1, false), Duration::ZERO);
        assert_eq!(policy.delay_for(7, false), Duration::ZERO);
    }

    #[test]
    fn debounce_replaces_settle_delay() {
        let policy = UpEventPolicy::default().with_up_event_delay(Duration::from_secs(2));

        assert_eq!(policy.debounce(), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_for(0, true), Duration::ZERO);
    }

    #[test]
    fn zero_settle_delay_means_immediate_delivery() {
        let policy = UpEventPolicy::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(policy.delay_for(0, false), Duration::ZERO);
    }
}
