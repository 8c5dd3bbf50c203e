//! Listener registration.

use std::sync::{Arc, Mutex, PoisonError};

use super::ChangeListener;

/// The set of registered listeners.
///
/// Delivery iterates over a [`ListenerRegistry::snapshot`], so listeners
/// added or removed concurrently do not affect an in-flight delivery.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<Vec<Arc<dyn ChangeListener>>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. Returns true if it is the first one.
    ///
    /// Registering the same listener twice is a no-op.
    pub fn add(&self, listener: Arc<dyn ChangeListener>) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        if listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        listeners.len() == 1
    }

    /// Unregisters `listener`. Returns true if it was registered.
    pub fn remove(&self, listener: &Arc<dyn ChangeListener>) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    /// Copies the current listener list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn ChangeListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .snapshot()
            .iter()
            .map(|l| l.name().to_string())
            .collect();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &names)
            .finish()
    }
}
