//! Single-consumer event delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

use super::{ListenerRegistry, PendingEvents, deliver};
use crate::monitor::{ChangeEvent, EventSink};

struct Shared {
    queue: Mutex<PendingEvents>,
    wake: Notify,
    registry: Arc<ListenerRegistry>,
    stop: watch::Sender<bool>,
    running: AtomicBool,
}

impl Shared {
    /// Takes the next event, or discards the backlog if nobody listens.
    fn next(&self) -> Option<(ChangeEvent, Duration)> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        if self.registry.is_empty() {
            let dropped = queue.clear();
            if dropped > 0 {
                tracing::debug!(dropped, "No listeners, discarding pending events");
            }
            return None;
        }
        queue.pop()
    }
}

/// Decouples change detection from listener notification.
///
/// Producers call [`EventDispatcher::fire_change_event`] from anywhere; it
/// only enqueues. A single task drains the queue, waits out each event's
/// delay and delivers it to a snapshot of the registered listeners, so
/// listener calls never overlap.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct EventDispatcher {
    shared: Arc<Shared>,
}

impl EventDispatcher {
    /// Creates a stopped dispatcher delivering to `registry`.
    #[must_use]
    pub fn new(registry: Arc<ListenerRegistry>) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(PendingEvents::new()),
                wake: Notify::new(),
                registry,
                stop,
                running: AtomicBool::new(false),
            }),
        }
    }

    /// Spawns the delivery task on `handle`.
    ///
    /// Returns `None` if the dispatcher is already running.
    pub fn start(&self, handle: &Handle) -> Option<JoinHandle<()>> {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return None;
        }
        self.shared.stop.send_replace(false);
        Some(handle.spawn(run(Arc::clone(&self.shared))))
    }

    /// Queues `event` for delivery after `delay`.
    ///
    /// Never blocks. With no listeners registered the event is dropped.
    pub fn fire_change_event(&self, event: ChangeEvent, delay: Duration) {
        if self.shared.registry.is_empty() {
            tracing::trace!(event = %event, "No listeners, dropping event");
            return;
        }
        let queued = self
            .shared
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event, delay);
        if queued {
            self.shared.wake.notify_one();
        }
    }

    /// Asks the delivery task to exit. Pending events are not delivered.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.stop.send_replace(true);
    }

    /// Returns true between [`EventDispatcher::start`] and
    /// [`EventDispatcher::stop`].
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Number of events waiting for delivery.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl EventSink for EventDispatcher {
    fn fire(&self, event: ChangeEvent, delay: Duration) {
        self.fire_change_event(event, delay);
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("running", &self.is_running())
            .field("pending", &self.pending())
            .finish()
    }
}

async fn run(shared: Arc<Shared>) {
    let mut stop = shared.stop.subscribe();
    tracing::debug!("Event dispatcher started");

    loop {
        if *stop.borrow_and_update() {
            break;
        }

        let Some((event, delay)) = shared.next() else {
            tokio::select! {
                biased;
                _ = stop.changed() => {}
                () = shared.wake.notified() => {}
            }
            continue;
        };

        if !delay.is_zero() {
            tokio::select! {
                biased;
                _ = stop.changed() => continue,
                () = tokio::time::sleep(delay) => {}
            }
        }

        tracing::debug!(event = %event, "Delivering change");
        for listener in shared.registry.snapshot() {
            deliver(listener.as_ref(), &event);
        }
    }

    tracing::debug!("Event dispatcher stopped");
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
