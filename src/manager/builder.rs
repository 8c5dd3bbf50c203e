//! Assembly of a [`NetworkManager`] from its parts.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::runtime::Handle;
use tokio::sync::Notify;

use super::enricher::Enricher;
use super::{AddressLookup, ManagerError, NetworkManager, Parts, State};
use crate::dispatch::{ChangeListener, EventDispatcher, ListenerRegistry};
use crate::monitor::{CaptivePortalCheck, DnsConfigSource, NeverRestricted, WatcherConfig};
use crate::network::{InterfaceEnumerator, SnapshotProvider};
use crate::task::{TaskSubmitter, TokioTaskSubmitter};
use crate::time::{Clock, SystemClock};
use crate::wifi::{ConnectionInfoCache, ConnectionInfoLookup, WifiInfoSource};

/// Builder for [`NetworkManager`].
///
/// Only the interface enumerator is required; every other collaborator
/// has an inert default.
pub struct NetworkManagerBuilder {
    enumerator: Box<dyn InterfaceEnumerator>,
    config: WatcherConfig,
    captive: Arc<dyn CaptivePortalCheck>,
    wifi: Option<Arc<dyn WifiInfoSource>>,
    dns: Option<Arc<dyn DnsConfigSource>>,
    clock: Arc<dyn Clock>,
    connection_lookup: Option<Arc<dyn ConnectionInfoLookup>>,
    address_lookups: Vec<Arc<dyn AddressLookup>>,
    tasks: Option<Arc<dyn TaskSubmitter>>,
    handle: Option<Handle>,
}

impl NetworkManagerBuilder {
    pub(super) fn new(enumerator: impl InterfaceEnumerator + 'static) -> Self {
        Self {
            enumerator: Box::new(enumerator),
            config: WatcherConfig::default(),
            captive: Arc::new(NeverRestricted),
            wifi: None,
            dns: None,
            clock: Arc::new(SystemClock),
            connection_lookup: None,
            address_lookups: Vec::new(),
            tasks: None,
            handle: None,
        }
    }

    /// Sets the watcher tuning.
    #[must_use]
    pub fn with_config(mut self, config: WatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the captive-portal checker.
    #[must_use]
    pub fn with_captive_check(mut self, captive: Arc<dyn CaptivePortalCheck>) -> Self {
        self.captive = captive;
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

    /// Enables the per-address connection-info cache.
    #[must_use]
    pub fn with_connection_info(mut self, lookup: Arc<dyn ConnectionInfoLookup>) -> Self {
        self.connection_lookup = Some(lookup);
        self
    }

    /// Adds a lookup run for every address that comes up.
    ///
    /// Requires [`NetworkManagerBuilder::with_connection_info`]; without a
    /// cache there is nothing to feed the lookup and it is never called.
    #[must_use]
    pub fn with_address_lookup(mut self, lookup: Arc<dyn AddressLookup>) -> Self {
        self.address_lookups.push(lookup);
        self
    }

    /// Sets where background lookups run.
    #[must_use]
    pub fn with_task_submitter(mut self, tasks: Arc<dyn TaskSubmitter>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Sets the runtime the watcher and dispatcher are spawned on.
    #[must_use]
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Builds the manager. Nothing is started until the first listener is
    /// added.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NoRuntime`] if no handle was given and the
    /// caller is not inside a Tokio runtime.
    pub fn build(self) -> Result<NetworkManager, ManagerError> {
        let handle = match self.handle {
            Some(handle) => handle,
            None => Handle::try_current()?,
        };
        if !self.address_lookups.is_empty() && self.connection_lookup.is_none() {
            tracing::warn!(
                lookups = self.address_lookups.len(),
                "Address lookups configured without connection info, they will not run"
            );
        }

        let provider = Arc::new(SnapshotProvider::new(self.enumerator));
        let registry = Arc::new(ListenerRegistry::new());
        let dispatcher = EventDispatcher::new(Arc::clone(&registry));
        let tasks = self
            .tasks
            .unwrap_or_else(|| Arc::new(TokioTaskSubmitter::new(handle.clone())));

        let cache = self.connection_lookup.map(|lookup| {
            Arc::new(ConnectionInfoCache::new(
                lookup,
                Arc::clone(&provider),
                Arc::clone(&tasks),
                self.config.lookup_timeout,
            ))
        });
        let enricher = cache.as_ref().map(|cache| {
            Arc::new(Enricher::new(
                Arc::clone(cache),
                self.address_lookups,
                Arc::clone(&tasks),
            )) as Arc<dyn ChangeListener>
        });

        Ok(NetworkManager {
            handle,
            provider,
            registry,
            dispatcher,
            restricted: Arc::new(AtomicBool::new(false)),
            watcher_done: Arc::new(Notify::new()),
            cache,
            enricher,
            parts: Parts {
                config: self.config,
                captive: self.captive,
                wifi: self.wifi,
                dns: self.dns,
                clock: self.clock,
            },
            state: std::sync::Mutex::new(State::Idle),
        })
    }
}

impl std::fmt::Debug for NetworkManagerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkManagerBuilder")
            .field("config", &self.config)
            .field("address_lookups", &self.address_lookups.len())
            .finish_non_exhaustive()
    }
}
