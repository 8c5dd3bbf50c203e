//! Cached access to the host's interface list.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use super::{EnumerationError, InterfaceEnumerator, InterfaceKey, InterfaceSnapshot};

/// Memoized loopback checks, valid for one interface topology.
///
/// The generation is bumped whenever a refresh observes a different set of
/// interface keys; entries stamped with an older generation are discarded.
#[derive(Debug, Default)]
struct LoopbackMemo {
    generation: u64,
    topology: BTreeSet<InterfaceKey>,
    entries: HashMap<InterfaceKey, (u64, bool)>,
}

impl LoopbackMemo {
    fn observe_topology(&mut self, interfaces: &[InterfaceSnapshot]) {
        let topology: BTreeSet<InterfaceKey> = interfaces.iter().map(InterfaceSnapshot::key).collect();
        if topology != self.topology {
            self.generation += 1;
            self.topology = topology;
            let current = self.generation;
            self.entries.retain(|_, (generation, _)| *generation == current);
        }
    }
}

/// Provides the current interface list with a short-lived cache.
///
/// Enumeration is an expensive OS call; callers that do not need fresh data
/// (listener catch-up, cache reloads) share the last snapshot, while the
/// watcher forces a refresh on every poll.
pub struct SnapshotProvider {
    enumerator: Box<dyn InterfaceEnumerator>,
    cache: Mutex<Option<Arc<[InterfaceSnapshot]>>>,
    loopback: Mutex<LoopbackMemo>,
}

impl SnapshotProvider {
    /// Creates a provider around the given enumerator. Nothing is queried yet.
    #[must_use]
    pub fn new(enumerator: impl InterfaceEnumerator + 'static) -> Self {
        Self {
            enumerator: Box::new(enumerator),
            cache: Mutex::new(None),
            loopback: Mutex::new(LoopbackMemo::default()),
        }
    }

    /// Returns the interface list.
    ///
    /// Without `force_refresh` the cached list is returned unless it is
    /// empty. Otherwise the OS is queried once and the result replaces the
    /// cache wholesale.
    ///
    /// # Errors
    ///
    /// Propagates the enumerator's [`EnumerationError`]; no retry happens
    /// here and the previous cache is kept.
    pub fn get_interfaces(
        &self,
        force_refresh: bool,
    ) -> Result<Arc<[InterfaceSnapshot]>, EnumerationError> {
        if !force_refresh {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.as_ref().filter(|c| !c.is_empty()) {
                return Ok(Arc::clone(cached));
            }
        }

        let fresh: Arc<[InterfaceSnapshot]> = self.enumerator.enumerate()?.into();
        tracing::trace!(count = fresh.len(), "Enumerated interfaces");

        self.loopback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe_topology(&fresh);
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&fresh));

        Ok(fresh)
    }

    /// Returns true if the interface is a loopback interface.
    ///
    /// The determination is memoized per interface key for the current
    /// topology generation.
    pub fn is_loopback(&self, interface: &InterfaceSnapshot) -> bool {
        let key = interface.key();
        let mut memo = self.loopback.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = memo.generation;

        if let Some(&(stamp, result)) = memo.entries.get(&key) {
            if stamp == generation {
                return result;
            }
        }

        let result = interface.is_loopback()
            || (interface.has_addresses() && interface.addresses().iter().all(|a| a.is_loopback()));
        memo.entries.insert(key, (generation, result));
        result
    }

    /// Returns the interfaces the watcher cares about: up, not loopback, and
    /// with at least one bound address.
    ///
    /// # Errors
    ///
    /// Propagates [`SnapshotProvider::get_interfaces`] errors.
    pub fn usable_interfaces(
        &self,
        force_refresh: bool,
    ) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
        let all = self.get_interfaces(force_refresh)?;
        Ok(all
            .iter()
            .filter(|i| i.is_up && i.has_addresses() && !self.is_loopback(i))
            .cloned()
            .collect())
    }

    /// Current topology generation of the loopback memo.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.loopback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }
}

impl std::fmt::Debug for SnapshotProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotProvider")
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
