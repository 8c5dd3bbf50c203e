//! Pending event queue with coalescing.

use std::collections::VecDeque;
use std::time::Duration;

use crate::monitor::ChangeEvent;

/// Events waiting for delivery, oldest first.
///
/// Inserting an event equal to one already pending keeps the original
/// position and replaces its delay.
#[derive(Debug, Default)]
pub struct PendingEvents {
    entries: VecDeque<(ChangeEvent, Duration)>,
}

impl PendingEvents {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Queues `event`. Returns false if it coalesced with a pending entry.
    pub fn insert(&mut self, event: ChangeEvent, delay: Duration) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|(e, _)| *e == event) {
            entry.1 = delay;
            return false;
        }
        self.entries.push_back((event, delay));
        true
    }

    /// Takes the oldest entry.
    pub fn pop(&mut self) -> Option<(ChangeEvent, Duration)> {
        self.entries.pop_front()
    }

    /// Drops everything, returning how many entries were discarded.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_insertion_order() {
        let mut queue = PendingEvents::new();
        queue.insert(ChangeEvent::iface_down("eth0"), Duration::ZERO);
        queue.insert(ChangeEvent::iface_up("wlan0"), Duration::from_millis(500));

        assert_eq!(queue.pop().unwrap().0, ChangeEvent::iface_down("eth0"));
        assert_eq!(
            queue.pop(),
            Some((ChangeEvent::iface_up("wlan0"), Duration::from_millis(500)))
        );
        assert!(queue.pop().is_none());
    }

    #[test]
    fn duplicate_keeps_position_and_takes_new_delay() {
        let mut queue = PendingEvents::new();
        queue.insert(ChangeEvent::iface_up("eth0"), Duration::from_millis(500));
        queue.insert(ChangeEvent::dns_change(), Duration::ZERO);

        assert!(!queue.insert(ChangeEvent::iface_up("eth0"), Duration::ZERO));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some((ChangeEvent::iface_up("eth0"), Duration::ZERO)));
    }

    #[test]
    fn clear_reports_dropped_count() {
        let mut queue = PendingEvents::new();
        queue.insert(ChangeEvent::iface_up("eth0"), Duration::ZERO);
        queue.insert(ChangeEvent::iface_up("eth1"), Duration::ZERO);

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }
}
