//! Pure change detection between the active map and a fresh snapshot.

use std::net::IpAddr;

use super::{ActiveInterfaceMap, ChangeEvent};
use crate::network::InterfaceSnapshot;

/// Differences between the active map and a fresh list of usable interfaces.
///
/// Each section lists `(interface name, addresses)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceDiff {
    /// Interfaces that are no longer present, with all their addresses.
    pub dead: Vec<(String, Vec<IpAddr>)>,
    /// Addresses gone from interfaces that are still present.
    pub lost: Vec<(String, Vec<IpAddr>)>,
    /// Addresses new on interfaces that were already present.
    pub gained: Vec<(String, Vec<IpAddr>)>,
    /// Interfaces that were not present before, with all their addresses.
    pub appeared: Vec<(String, Vec<IpAddr>)>,
}

impl InterfaceDiff {
    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dead.is_empty() && self.lost.is_empty() && !self.has_up()
    }

    /// Returns true if any interface or address came up.
    #[must_use]
    pub fn has_up(&self) -> bool {
        !self.gained.is_empty() || !self.appeared.is_empty()
    }

    /// `IFACE_DOWN` then `ADDRESS_DOWN`s for each dead interface, followed by
    /// `ADDRESS_DOWN`s for addresses lost from surviving interfaces.
    #[must_use]
    pub fn down_events(&self) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        for (name, addrs) in &self.dead {
            events.push(ChangeEvent::iface_down(name));
            events.extend(addrs.iter().map(|&a| ChangeEvent::address_down(name, a)));
        }
        for (name, addrs) in &self.lost {
            events.extend(addrs.iter().map(|&a| ChangeEvent::address_down(name, a)));
        }
        events
    }

    /// `ADDRESS_UP`s for addresses gained on surviving interfaces, followed
    /// by `ADDRESS_UP`s then `IFACE_UP` for each new interface.
    #[must_use]
    pub fn up_events(&self) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        for (name, addrs) in &self.gained {
            events.extend(addrs.iter().map(|&a| ChangeEvent::address_up(name, a)));
        }
        for (name, addrs) in &self.appeared {
            events.extend(addrs.iter().map(|&a| ChangeEvent::address_up(name, a)));
            events.push(ChangeEvent::iface_up(name));
        }
        events
    }
}

/// Compares the active map with the current usable interfaces.
///
/// `current` is expected to hold only usable interfaces (up, non-loopback,
/// with addresses). Interfaces are matched by name; the first snapshot of a
/// duplicated name wins.
///
/// # Algorithm
///
/// - Names active before but missing now are `dead`
/// - For names present in both, addresses only in the old list are `lost`
///   and addresses only in the new list are `gained`
/// - Names present now but not before have `appeared`
#[must_use]
pub fn diff(active: &ActiveInterfaceMap, current: &[InterfaceSnapshot]) -> InterfaceDiff {
    let current = ActiveInterfaceMap::from_snapshots(current);
    let mut result = InterfaceDiff::default();

    for (name, old_addrs) in active.iter() {
        match current.get(name) {
            None => result.dead.push((name.to_string(), old_addrs.to_vec())),
            Some(new_addrs) => {
                let lost: Vec<IpAddr> = old_addrs
                    .iter()
                    .filter(|a| !new_addrs.contains(a))
                    .copied()
                    .collect();
                let gained: Vec<IpAddr> = new_addrs
                    .iter()
                    .filter(|a| !old_addrs.contains(a))
                    .copied()
                    .collect();
                if !lost.is_empty() {
                    result.lost.push((name.to_string(), lost));
                }
                if !gained.is_empty() {
                    result.gained.push((name.to_string(), gained));
                }
            }
        }
    }

    for (name, addrs) in current.iter() {
        if !active.contains(name) {
            result.appeared.push((name.to_string(), addrs.to_vec()));
        }
    }

    result
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
