//! The public entry point tying the watcher, dispatcher and listeners
//! together.
//!
//! A [`NetworkManager`] is inert until its first listener arrives. Adding
//! that listener starts the dispatcher and the watcher; every listener,
//! first or not, is then caught up synchronously with the current
//! configuration before [`NetworkManager::add_listener`] returns.

mod builder;
mod enricher;

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

pub use builder::NetworkManagerBuilder;
pub use enricher::AddressLookup;

use crate::dispatch::{ChangeListener, EventDispatcher, ListenerRegistry, deliver};
use crate::monitor::{
    CaptivePortalCheck, ChangeEvent, DnsConfigSource, EventSink, WatchError, Watcher,
    WatcherConfig,
};
use crate::network::{InterfaceEnumerator, SnapshotProvider};
use crate::time::Clock;
use crate::wifi::{ConnectionInfo, ConnectionInfoCache, WifiInfoSource};

/// Errors from assembling a [`NetworkManager`].
#[derive(Debug, Error)]
pub enum ManagerError {
    /// No runtime handle was given and none is current.
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Watcher collaborators kept until the first listener starts it.
struct Parts {
    config: WatcherConfig,
    captive: Arc<dyn CaptivePortalCheck>,
    wifi: Option<Arc<dyn WifiInfoSource>>,
    dns: Option<Arc<dyn DnsConfigSource>>,
    clock: Arc<dyn Clock>,
}

struct Running {
    shutdown: watch::Sender<bool>,
    watcher: JoinHandle<Result<(), WatchError>>,
    dispatcher: Option<JoinHandle<()>>,
}

enum State {
    Idle,
    Running(Running),
    Stopped,
}

/// Watches the host's network configuration on behalf of listeners.
pub struct NetworkManager {
    handle: Handle,
    provider: Arc<SnapshotProvider>,
    registry: Arc<ListenerRegistry>,
    dispatcher: EventDispatcher,
    restricted: Arc<AtomicBool>,
    watcher_done: Arc<Notify>,
    cache: Option<Arc<ConnectionInfoCache>>,
    enricher: Option<Arc<dyn ChangeListener>>,
    parts: Parts,
    state: Mutex<State>,
}

impl NetworkManager {
    /// Starts building a manager around `enumerator`.
    #[must_use]
    pub fn builder(enumerator: impl InterfaceEnumerator + 'static) -> NetworkManagerBuilder {
        NetworkManagerBuilder::new(enumerator)
    }

    /// Registers `listener` and catches it up with the current
    /// configuration.
    ///
    /// The first call starts the dispatcher and the watcher. Before this
    /// returns, `listener` has received, in order: `AddressUp` for every
    /// address of every usable interface, `IfaceUp` for every such
    /// interface, and `NowRestricted` if a captive portal is currently
    /// restricting access. Adding a listener twice has no further effect on
    /// registration but repeats the catch-up.
    pub fn add_listener(&self, listener: Arc<dyn ChangeListener>) {
        self.registry.add(Arc::clone(&listener));
        tracing::debug!(listener = listener.name(), "Listener added");
        self.ensure_started();
        self.catch_up(listener.as_ref());
    }

    /// Unregisters `listener`. Returns true if it was registered.
    ///
    /// The watcher keeps running with no listeners; events fired meanwhile
    /// are dropped.
    pub fn remove_listener(&self, listener: &Arc<dyn ChangeListener>) -> bool {
        self.registry.remove(listener)
    }

    /// Queues an event for every listener, as if the watcher had seen it.
    pub fn fire_change_event(&self, event: ChangeEvent, delay: Duration) {
        self.dispatcher.fire_change_event(event, delay);
    }

    /// Returns true once a listener has started event delivery, until
    /// [`NetworkManager::shutdown`].
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.dispatcher.is_running()
    }

    /// Returns true if a captive portal was restricting access at the
    /// last check.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.restricted.load(Ordering::SeqCst)
    }

    /// Connection details for a local address.
    ///
    /// Returns `None` when the manager was built without connection info.
    pub async fn connection_info(&self, address: IpAddr, force_update: bool) -> Option<ConnectionInfo> {
        match &self.cache {
            Some(cache) => Some(cache.get(address, force_update).await),
            None => None,
        }
    }

    /// Clears the connection-info cache and refreshes every current
    /// address in the background. Returns the number of refreshes queued.
    pub fn reload_connection_info(&self) -> usize {
        self.cache.as_ref().map_or(0, ConnectionInfoCache::reload)
    }

    /// Completes when the watcher task exits, whether through failure or
    /// [`NetworkManager::shutdown`].
    ///
    /// Pending until a listener has started the watcher.
    pub async fn watcher_stopped(&self) {
        self.watcher_done.notified().await;
    }

    /// Stops the watcher and the dispatcher.
    ///
    /// Pending events are discarded. The manager cannot be restarted.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the watcher, if it failed.
    pub async fn shutdown(&self) -> Result<(), WatchError> {
        let previous = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, State::Stopped)
        };
        let State::Running(running) = previous else {
            return Ok(());
        };

        running.shutdown.send_replace(true);
        self.dispatcher.stop();
        if let Some(dispatcher) = running.dispatcher {
            if let Err(error) = dispatcher.await {
                tracing::warn!(error = %error, "Event dispatcher task failed");
            }
        }

        let result = match running.watcher.await {
            Ok(result) => result,
            Err(join_error) => Err(WatchError::Panicked(join_error.to_string())),
        };
        tracing::info!("Network manager stopped");
        result
    }

    fn ensure_started(&self) {
        let started = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(*state, State::Idle) {
                *state = State::Running(self.start());
                true
            } else {
                false
            }
        };

        // Addresses present at startup get their lookups like any new one.
        if let (true, Some(enricher)) = (started, &self.enricher) {
            self.catch_up(enricher.as_ref());
        }
    }

    fn start(&self) -> Running {
        let dispatcher = self.dispatcher.start(&self.handle);
        if let Some(enricher) = &self.enricher {
            self.registry.add(Arc::clone(enricher));
        }

        let (shutdown, receiver) = watch::channel(false);
        let watcher = self.build_watcher();
        let done = Arc::clone(&self.watcher_done);
        let watcher = self.handle.spawn(async move {
            let result = watcher.run(receiver).await;
            if let Err(error) = &result {
                tracing::error!(error = %error, "Network watcher failed");
            }
            done.notify_one();
            result
        });

        tracing::info!("Network manager started");
        Running {
            shutdown,
            watcher,
            dispatcher,
        }
    }

    fn build_watcher(&self) -> Watcher {
        let sink: Arc<dyn EventSink> = Arc::new(self.dispatcher.clone());
        let mut watcher = Watcher::new(self.parts.config.clone(), Arc::clone(&self.provider), sink)
            .with_captive_check(Arc::clone(&self.parts.captive))
            .with_restricted_flag(Arc::clone(&self.restricted))
            .with_clock(Arc::clone(&self.parts.clock));
        if let Some(wifi) = &self.parts.wifi {
            watcher = watcher.with_wifi_source(Arc::clone(wifi));
        }
        if let Some(dns) = &self.parts.dns {
            watcher = watcher.with_dns_source(Arc::clone(dns));
        }
        watcher
    }

    fn catch_up(&self, listener: &dyn ChangeListener) {
        let interfaces = match self.provider.usable_interfaces(false) {
            Ok(interfaces) => interfaces,
            Err(error) => {
                tracing::warn!(error = %error, "Cannot enumerate interfaces for catch-up");
                Vec::new()
            }
        };

        for interface in &interfaces {
            for &address in interface.addresses() {
                deliver(listener, &ChangeEvent::address_up(&interface.name, address));
            }
        }
        for interface in &interfaces {
            deliver(listener, &ChangeEvent::iface_up(&interface.name));
        }
        if self.is_restricted() {
            deliver(listener, &ChangeEvent::captive_portal(true));
        }
    }
}

impl std::fmt::Debug for NetworkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkManager")
            .field("dispatcher", &self.dispatcher)
            .field("listeners", &self.registry.len())
            .field("restricted", &self.is_restricted())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
