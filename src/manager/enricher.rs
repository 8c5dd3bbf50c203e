//! Per-address background lookups driven by change events.

use std::net::IpAddr;
use std::sync::Arc;

use crate::dispatch::{ChangeListener, ListenerError};
use crate::monitor::{ChangeEvent, ChangeKind};
use crate::task::TaskSubmitter;
use crate::wifi::{ConnectionInfo, ConnectionInfoCache};

/// A lookup run for every address that comes up or changes access point,
/// such as resolving an emergency location.
///
/// Lookups run on the blocking pool and may take arbitrarily long.
pub trait AddressLookup: Send + Sync {
    /// Performs the lookup for `address`, given its fresh connection details.
    ///
    /// # Errors
    ///
    /// Errors are logged and otherwise ignored.
    fn lookup(&self, address: IpAddr, info: &ConnectionInfo) -> Result<(), ListenerError>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Internal listener keeping the connection-info cache current and
/// triggering [`AddressLookup`]s.
///
/// All work is handed to the task submitter; delivery returns at once.
pub(crate) struct Enricher {
    cache: Arc<ConnectionInfoCache>,
    lookups: Arc<[Arc<dyn AddressLookup>]>,
    tasks: Arc<dyn TaskSubmitter>,
}

impl Enricher {
    pub(crate) fn new(
        cache: Arc<ConnectionInfoCache>,
        lookups: Vec<Arc<dyn AddressLookup>>,
        tasks: Arc<dyn TaskSubmitter>,
    ) -> Self {
        Self {
            cache,
            lookups: lookups.into(),
            tasks,
        }
    }

    fn schedule(&self, address: IpAddr) {
        let cache = Arc::clone(&self.cache);
        let lookups = Arc::clone(&self.lookups);
        self.tasks.submit(
            "network-lookup",
            Box::pin(async move {
                let info = cache.get(address, true).await;
                for lookup in lookups.iter() {
                    run_lookup(Arc::clone(lookup), address, info.clone()).await;
                }
            }),
        );
    }
}

async fn run_lookup(lookup: Arc<dyn AddressLookup>, address: IpAddr, info: ConnectionInfo) {
    let name = lookup.name().to_string();
    match tokio::task::spawn_blocking(move || lookup.lookup(address, &info)).await {
        Ok(Ok(())) => tracing::debug!(lookup = %name, address = %address, "Address lookup done"),
        Ok(Err(error)) => {
            tracing::warn!(lookup = %name, address = %address, error = %error, "Address lookup failed");
        }
        Err(join_error) => {
            tracing::warn!(lookup = %name, address = %address, error = %join_error, "Address lookup panicked");
        }
    }
}

impl ChangeListener for Enricher {
    fn configuration_changed(&self, event: &ChangeEvent) -> Result<(), ListenerError> {
        let Some(address) = event.address else {
            return Ok(());
        };
        match event.kind {
            ChangeKind::AddressUp | ChangeKind::WifiInfoChanged => self.schedule(address),
            ChangeKind::AddressDown => self.cache.invalidate(address),
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "network-lookup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{EnumerationError, InterfaceEnumerator, InterfaceSnapshot, SnapshotProvider};
    use crate::task::BoxFuture;
    use crate::wifi::{ConnectionInfoLookup, LookupError};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct HeldTasks {
        tasks: Mutex<Vec<(String, BoxFuture<'static, ()>)>>,
    }

    impl HeldTasks {
        fn names(&self) -> Vec<String> {
            self.tasks.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
        }

        async fn run_all(&self) {
            let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock().unwrap());
            for (_, task) in tasks {
                task.await;
            }
        }
    }

    impl TaskSubmitter for HeldTasks {
        fn submit(&self, name: &str, task: BoxFuture<'static, ()>) {
            self.tasks.lock().unwrap().push((name.to_string(), task));
        }
    }

    struct FixedLookup(ConnectionInfo);

    impl ConnectionInfoLookup for FixedLookup {
        fn lookup(&self, _address: IpAddr) -> Result<ConnectionInfo, LookupError> {
            Ok(self.0.clone())
        }
    }

    struct NoInterfaces;

    impl InterfaceEnumerator for NoInterfaces {
        fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct RecordingLookup {
        seen: Mutex<Vec<(IpAddr, ConnectionInfo)>>,
    }

    impl AddressLookup for RecordingLookup {
        fn lookup(&self, address: IpAddr, info: &ConnectionInfo) -> Result<(), ListenerError> {
            self.seen.lock().unwrap().push((address, info.clone()));
            Ok(())
        }
    }

    struct FailingLookup;

    impl AddressLookup for FailingLookup {
        fn lookup(&self, _address: IpAddr, _info: &ConnectionInfo) -> Result<(), ListenerError> {
            Err("location service unavailable".into())
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn home() -> ConnectionInfo {
        ConnectionInfo::wireless("Home", "aa:bb:cc:dd:ee:ff")
    }

    fn enricher(lookups: Vec<Arc<dyn AddressLookup>>) -> (Enricher, Arc<ConnectionInfoCache>, Arc<HeldTasks>) {
        let tasks = Arc::new(HeldTasks::default());
        let cache = Arc::new(ConnectionInfoCache::new(
            Arc::new(FixedLookup(home())),
            Arc::new(SnapshotProvider::new(NoInterfaces)),
            Arc::clone(&tasks) as Arc<dyn TaskSubmitter>,
            Duration::from_secs(5),
        ));
        let enricher = Enricher::new(
            Arc::clone(&cache),
            lookups,
            Arc::clone(&tasks) as Arc<dyn TaskSubmitter>,
        );
        (enricher, cache, tasks)
    }

    #[tokio::test]
    async fn address_up_refreshes_cache_then_runs_lookups() {
        let recorder = Arc::new(RecordingLookup::default());
        let (enricher, cache, tasks) = enricher(vec![
            Arc::new(FailingLookup) as Arc<dyn AddressLookup>,
            Arc::clone(&recorder) as Arc<dyn AddressLookup>,
        ]);

        enricher
            .configuration_changed(&ChangeEvent::address_up("wlan0", ip("192.168.1.10")))
            .unwrap();
        assert_eq!(tasks.names(), vec!["network-lookup".to_string()]);
        assert!(cache.is_empty());

        tasks.run_all().await;

        assert_eq!(cache.cached(ip("192.168.1.10")), Some(home()));
        assert_eq!(*recorder.seen.lock().unwrap(), vec![(ip("192.168.1.10"), home())]);
    }

    #[tokio::test]
    async fn wifi_change_schedules_lookup() {
        let (enricher, _cache, tasks) = enricher(vec![]);

        enricher
            .configuration_changed(&ChangeEvent::wifi_info_changed("wlan0", ip("192.168.1.10")))
            .unwrap();

        assert_eq!(tasks.names().len(), 1);
    }

    #[tokio::test]
    async fn address_down_invalidates_entry() {
        let (enricher, cache, tasks) = enricher(vec![]);
        cache.get(ip("10.0.0.5"), false).await;

        enricher
            .configuration_changed(&ChangeEvent::address_down("eth0", ip("10.0.0.5")))
            .unwrap();

        assert!(cache.cached(ip("10.0.0.5")).is_none());
        assert!(tasks.names().is_empty());
    }

    #[test]
    fn interface_events_are_ignored() {
        let (enricher, _cache, tasks) = enricher(vec![]);

        enricher.configuration_changed(&ChangeEvent::iface_up("eth0")).unwrap();
        enricher.configuration_changed(&ChangeEvent::dns_change()).unwrap();

        assert!(tasks.names().is_empty());
    }
}
