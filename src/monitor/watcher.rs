//! The polling watcher.
//!
//! [`Watcher`] owns the [`ActiveInterfaceMap`] and is the only code that
//! mutates it. Each poll cycle:
//!
//! 1. Detects resume-from-standby (an idle gap since the previous cycle
//!    above `standby_factor` times the interval) and, if so, marks every
//!    interface down and stops there
//! 2. Takes a forced snapshot of usable interfaces
//! 3. Emits down events for dead interfaces and lost addresses
//! 4. Sleeps the configured debounce if anything came up
//! 5. Checks the captive portal once if anything changed
//! 6. Emits up events, the first one carrying the settle delay unless the
//!    watcher already debounced
//! 7. Polls Wi-Fi associations and resolver configuration

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::captive::{CaptivePortalCheck, NeverRestricted};
use super::dns::DnsConfigSource;
use super::error::{DEFAULT_BENIGN_FAULTS, FaultClass, WatchError, classify};
use super::{ActiveInterfaceMap, ChangeEvent, EventSink, InterfaceDiff, UpEventPolicy, diff};
use crate::network::{InterfaceSnapshot, SnapshotProvider};
use crate::task::run_blocking_with_timeout;
use crate::time::{Clock, SystemClock, gap};
use crate::wifi::{ConnectionInfo, WifiInfoSource};

/// Watcher tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Time between poll cycles.
    pub poll_interval: Duration,
    /// Delays applied to up events.
    pub up_events: UpEventPolicy,
    /// A poll gap above `poll_interval * standby_factor` means the host slept.
    pub standby_factor: u32,
    /// Whether to poll Wi-Fi associations for access point changes.
    pub track_wifi: bool,
    /// Substrings identifying harmless native enumeration faults.
    pub benign_faults: Vec<String>,
    /// Upper bound for a single Wi-Fi query.
    pub lookup_timeout: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            up_events: UpEventPolicy::default(),
            standby_factor: 4,
            track_wifi: false,
            benign_faults: DEFAULT_BENIGN_FAULTS.iter().map(ToString::to_string).collect(),
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

/// Polls the host's interfaces and turns differences into [`ChangeEvent`]s.
pub struct Watcher {
    config: WatcherConfig,
    provider: Arc<SnapshotProvider>,
    sink: Arc<dyn EventSink>,
    captive: Arc<dyn CaptivePortalCheck>,
    restricted: Arc<AtomicBool>,
    wifi: Option<Arc<dyn WifiInfoSource>>,
    dns: Option<Arc<dyn DnsConfigSource>>,
    clock: Arc<dyn Clock>,
    active: ActiveInterfaceMap,
    wifi_seen: HashMap<String, ConnectionInfo>,
    nameservers: Option<Vec<IpAddr>>,
    last_poll: Option<SystemTime>,
}

impl Watcher {
    /// Creates a watcher with no captive-portal, Wi-Fi or DNS collaborators.
    #[must_use]
    pub fn new(
        config: WatcherConfig,
        provider: Arc<SnapshotProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            provider,
            sink,
            captive: Arc::new(NeverRestricted),
            restricted: Arc::new(AtomicBool::new(false)),
            wifi: None,
            dns: None,
            clock: Arc::new(SystemClock),
            active: ActiveInterfaceMap::new(),
            wifi_seen: HashMap::new(),
            nameservers: None,
            last_poll: None,
        }
    }

    /// Sets the captive-portal checker.
    #[must_use]
    pub fn with_captive_check(mut self, captive: Arc<dyn CaptivePortalCheck>) -> Self {
        self.captive = captive;
        self
    }

    /// Shares the "currently restricted" flag with other components.
    #[must_use]
    pub fn with_restricted_flag(mut self, restricted: Arc<AtomicBool>) -> Self {
        self.restricted = restricted;
        self
    }

    /// Sets the Wi-Fi source polled when `track_wifi` is enabled.
    #[must_use]
    pub fn with_wifi_source(mut self, wifi: Arc<dyn WifiInfoSource>) -> Self {
        self.wifi = Some(wifi);
        self
    }

    /// Sets the resolver configuration source.
    #[must_use]
    pub fn with_dns_source(mut self, dns: Arc<dyn DnsConfigSource>) -> Self {
        self.dns = Some(dns);
        self
    }

    /// Sets the clock used for standby detection.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The interfaces the watcher currently believes active.
    #[must_use]
    pub const fn active(&self) -> &ActiveInterfaceMap {
        &self.active
    }

    /// Builds the initial state from one snapshot without firing anything.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if enumeration hits a fault of unknown scope.
    pub async fn prime(&mut self) -> Result<(), WatchError> {
        self.poll_cycle(false).await
    }

    /// Primes, then polls on the configured interval until `shutdown`
    /// becomes true or its sender is dropped. A shutdown request abandons a
    /// cycle that is still debouncing or probing.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] if enumeration hits a fault of unknown scope;
    /// the watcher stops at that point.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), WatchError> {
        self.prime().await?;
        tracing::info!(
            interfaces = self.active.len(),
            interval = ?self.config.poll_interval,
            "Network watcher started"
        );

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; priming covered it.
        ticker.tick().await;

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => break,
                        result = self.poll_cycle(true) => result?,
                    }
                }
            }
        }

        tracing::info!("Network watcher stopped");
        Ok(())
    }

    /// Runs one poll cycle.
    ///
    /// The standby gap is measured from the end of the previous cycle, so
    /// time spent debouncing or probing never counts as sleep.
    pub(crate) async fn poll_cycle(&mut self, fire_events: bool) -> Result<(), WatchError> {
        let started = self.clock.now();
        if let Some(previous) = self.last_poll {
            let elapsed = gap(previous, started);
            if fire_events && elapsed > self.standby_threshold() {
                self.collapse_after_standby(elapsed);
                self.last_poll = Some(self.clock.now());
                return Ok(());
            }
        }

        let result = self.observe(fire_events).await;
        self.last_poll = Some(self.clock.now());
        result
    }

    async fn observe(&mut self, fire_events: bool) -> Result<(), WatchError> {
        let Some(current) = self.snapshot().await? else {
            return Ok(());
        };

        let changes = diff(&self.active, &current);
        self.active.apply(&changes);
        if fire_events {
            self.emit(&changes).await;
        }

        if self.config.track_wifi {
            self.poll_wifi(fire_events).await;
        }
        self.poll_dns(fire_events);
        Ok(())
    }

    fn standby_threshold(&self) -> Duration {
        self.config
            .poll_interval
            .saturating_mul(self.config.standby_factor)
    }

    fn collapse_after_standby(&mut self, elapsed: Duration) {
        let names = self.active.clear();
        tracing::warn!(
            gap = ?elapsed,
            interfaces = names.len(),
            "Poll gap suggests resume from standby, marking all interfaces down"
        );
        for name in names {
            self.sink.fire(ChangeEvent::iface_down(name), Duration::ZERO);
        }
        self.wifi_seen.clear();
    }

    /// Takes a forced snapshot of usable interfaces.
    ///
    /// `Ok(None)` means the cycle should be skipped.
    async fn snapshot(&self) -> Result<Option<Vec<InterfaceSnapshot>>, WatchError> {
        let provider = Arc::clone(&self.provider);
        let result = tokio::task::spawn_blocking(move || provider.usable_interfaces(true))
            .await
            .map_err(|join_error| WatchError::Panicked(join_error.to_string()))?;

        let error = match result {
            Ok(current) => return Ok(Some(current)),
            Err(error) => error,
        };

        match classify(&error, &self.config.benign_faults) {
            FaultClass::Transient => {
                tracing::warn!(error = %error, "Interface enumeration failed, skipping this poll");
                Ok(None)
            }
            FaultClass::Benign => {
                tracing::info!(error = %error, "Ignoring known native fault");
                Ok(None)
            }
            FaultClass::Fatal => {
                tracing::error!(error = %error, "Unknown native fault, stopping watcher");
                Err(WatchError::UnknownNativeFault {
                    message: error.to_string(),
                })
            }
        }
    }

    async fn emit(&self, changes: &InterfaceDiff) {
        if changes.is_empty() {
            return;
        }

        let down_events = changes.down_events();
        let up_events = changes.up_events();
        tracing::info!(
            down = down_events.len(),
            up = up_events.len(),
            "Network configuration changed"
        );

        for event in down_events {
            self.sink.fire(event, Duration::ZERO);
        }

        let debounced = match self.config.up_events.debounce() {
            Some(delay) if !up_events.is_empty() => {
                tracing::debug!(delay = ?delay, "Debouncing up events");
                tokio::time::sleep(delay).await;
                true
            }
            _ => false,
        };

        self.check_captive_portal().await;

        for (position, event) in up_events.into_iter().enumerate() {
            let delay = self.config.up_events.delay_for(position, debounced);
            self.sink.fire(event, delay);
        }
    }

    async fn check_captive_portal(&self) {
        let restricted = self.captive.is_restricted().await;
        if self.restricted.swap(restricted, Ordering::SeqCst) != restricted {
            tracing::info!(restricted, "Captive portal state changed");
            self.sink
                .fire(ChangeEvent::captive_portal(restricted), Duration::ZERO);
        }
    }

    /// Reports access-point changes that leave addresses untouched.
    ///
    /// The first sighting of an interface only records its details.
    async fn poll_wifi(&mut self, fire_events: bool) {
        let Some(source) = self.wifi.clone() else {
            return;
        };
        let fresh = match run_blocking_with_timeout("wifi-info", self.config.lookup_timeout, move || {
            source.wifi_info_by_interface()
        })
        .await
        {
            Some(Ok(fresh)) => fresh,
            Some(Err(error)) => {
                tracing::debug!(error = %error, "Wi-Fi details unavailable");
                return;
            }
            None => return,
        };

        for (name, addresses) in self.active.iter() {
            let Some(info) = fresh.get(name) else {
                continue;
            };
            let previous = self.wifi_seen.insert(name.to_string(), info.clone());
            if fire_events && previous.is_some_and(|previous| previous != *info) {
                tracing::info!(interface = name, info = %info, "Wi-Fi association changed");
                for &address in addresses {
                    self.sink
                        .fire(ChangeEvent::wifi_info_changed(name, address), Duration::ZERO);
                }
            }
        }

        let active = &self.active;
        self.wifi_seen.retain(|name, _| active.contains(name));
    }

    fn poll_dns(&mut self, fire_events: bool) {
        let Some(source) = &self.dns else {
            return;
        };
        let servers = match source.nameservers() {
            Ok(servers) => servers,
            Err(error) => {
                tracing::debug!(error = %error, "Resolver configuration unavailable");
                return;
            }
        };

        let previous = self.nameservers.replace(servers.clone());
        if fire_events && previous.is_some_and(|previous| previous != servers) {
            tracing::info!(nameservers = ?servers, "Resolver configuration changed");
            self.sink.fire(ChangeEvent::dns_change(), Duration::ZERO);
        }
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("config", &self.config)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
