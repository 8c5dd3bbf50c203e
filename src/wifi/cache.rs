//! Address-keyed cache of connection details.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::{ConnectionInfo, ConnectionInfoLookup};
use crate::network::SnapshotProvider;
use crate::task::{TaskSubmitter, run_blocking_with_timeout};

/// Cache of [`ConnectionInfo`] keyed by local address.
///
/// Lookups run on the blocking pool with a timeout. A lookup that fails,
/// panics or times out yields [`ConnectionInfo::disconnected`], and that
/// value is cached like any other.
pub struct ConnectionInfoCache {
    lookup: Arc<dyn ConnectionInfoLookup>,
    provider: Arc<SnapshotProvider>,
    tasks: Arc<dyn TaskSubmitter>,
    timeout: Duration,
    entries: Mutex<HashMap<IpAddr, ConnectionInfo>>,
}

impl ConnectionInfoCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(
        lookup: Arc<dyn ConnectionInfoLookup>,
        provider: Arc<SnapshotProvider>,
        tasks: Arc<dyn TaskSubmitter>,
        timeout: Duration,
    ) -> Self {
        Self {
            lookup,
            provider,
            tasks,
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the details for `address`.
    ///
    /// A cached entry is returned unless `force_update` is set. Otherwise the
    /// platform is queried and the result replaces the entry.
    pub async fn get(&self, address: IpAddr, force_update: bool) -> ConnectionInfo {
        if !force_update {
            if let Some(hit) = self.cached(address) {
                return hit;
            }
        }

        let lookup = Arc::clone(&self.lookup);
        let info = match run_blocking_with_timeout("connection-info", self.timeout, move || {
            lookup.lookup(address)
        })
        .await
        {
            Some(Ok(info)) => info,
            Some(Err(error)) => {
                tracing::warn!(address = %address, error = %error, "Connection info lookup failed");
                ConnectionInfo::disconnected()
            }
            None => ConnectionInfo::disconnected(),
        };

        tracing::debug!(address = %address, info = %info, "Connection info updated");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address, info.clone());
        info
    }

    /// Returns the cached entry without querying.
    #[must_use]
    pub fn cached(&self, address: IpAddr) -> Option<ConnectionInfo> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&address)
            .cloned()
    }

    /// Drops the entry for `address`.
    pub fn invalidate(&self, address: IpAddr) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&address);
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the cache and schedules a forced lookup for every address of
    /// every interface currently known to the provider.
    ///
    /// Returns the number of lookups scheduled. Interfaces come from the
    /// provider's cached list; if that fails nothing is scheduled.
    pub fn reload(self: &Arc<Self>) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let interfaces = match self.provider.get_interfaces(false) {
            Ok(interfaces) => interfaces,
            Err(error) => {
                tracing::warn!(error = %error, "Cannot reload connection info");
                return 0;
            }
        };

        let mut scheduled = 0;
        for interface in interfaces.iter().filter(|i| !self.provider.is_loopback(i)) {
            for &address in interface.addresses() {
                let cache = Arc::clone(self);
                self.tasks.submit(
                    "connection-info-reload",
                    Box::pin(async move {
                        cache.get(address, true).await;
                    }),
                );
                scheduled += 1;
            }
        }
        tracing::debug!(scheduled, "Connection info reload scheduled");
        scheduled
    }
}

impl std::fmt::Debug for ConnectionInfoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionInfoCache")
            .field("entries", &self.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
