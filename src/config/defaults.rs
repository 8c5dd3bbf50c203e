//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default polling interval in seconds.
pub const POLL_INTERVAL_SECS: u64 = 10;

/// Default delay before up events are fired, in milliseconds. Zero disables
/// debouncing.
pub const UP_EVENT_DELAY_MS: u64 = 0;

/// Default settle delay carried by the first up event of a batch, in
/// milliseconds.
pub const SETTLE_DELAY_MS: u64 = 500;

/// Default standby detection factor.
pub const STANDBY_FACTOR: u32 = 4;

/// Smallest accepted standby factor.
pub const MIN_STANDBY_FACTOR: u32 = 2;

/// Default timeout for Wi-Fi and connection-info queries, in seconds.
pub const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Default captive-portal probe timeout, in seconds.
pub const CAPTIVE_TIMEOUT_SECS: u64 = 5;

/// Default captive-portal probe URL.
pub const CAPTIVE_PROBE_URL: &str = crate::monitor::captive::DEFAULT_PROBE_URL;

/// Default resolver configuration path.
pub const RESOLV_CONF: &str = crate::monitor::dns::DEFAULT_RESOLV_CONF;

/// Default polling interval as Duration.
#[must_use]
pub const fn poll_interval() -> Duration {
    Duration::from_secs(POLL_INTERVAL_SECS)
}

/// Default settle delay as Duration.
#[must_use]
pub const fn settle_delay() -> Duration {
    Duration::from_millis(SETTLE_DELAY_MS)
}

/// Default lookup timeout as Duration.
#[must_use]
pub const fn lookup_timeout() -> Duration {
    Duration::from_secs(LOOKUP_TIMEOUT_SECS)
}
