//! The watcher's view of which interfaces are currently active.

use std::collections::BTreeMap;
use std::net::IpAddr;

use super::InterfaceDiff;
use crate::network::InterfaceSnapshot;

/// Interface name to its ordered list of active addresses.
///
/// Owned by a single watcher; never shared. Iteration is in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveInterfaceMap {
    interfaces: BTreeMap<String, Vec<IpAddr>>,
}

impl ActiveInterfaceMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interfaces: BTreeMap::new(),
        }
    }

    /// Builds a map holding every given interface. Later duplicates of a
    /// name are ignored.
    #[must_use]
    pub fn from_snapshots(snapshots: &[InterfaceSnapshot]) -> Self {
        let mut map = Self::new();
        for snapshot in snapshots {
            map.interfaces
                .entry(snapshot.name.clone())
                .or_insert_with(|| snapshot.addresses().to_vec());
        }
        map
    }

    /// Addresses of `name`, if active.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[IpAddr]> {
        self.interfaces.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Iterates `(name, addresses)` in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[IpAddr])> {
        self.interfaces
            .iter()
            .map(|(name, addrs)| (name.as_str(), addrs.as_slice()))
    }

    /// Removes every entry, returning the names that were active.
    pub fn clear(&mut self) -> Vec<String> {
        std::mem::take(&mut self.interfaces).into_keys().collect()
    }

    /// Brings the map in line with the snapshot `diff` was computed against.
    pub fn apply(&mut self, diff: &InterfaceDiff) {
        for (name, _) in &diff.dead {
            self.interfaces.remove(name);
        }
        for (name, lost) in &diff.lost {
            if let Some(addrs) = self.interfaces.get_mut(name) {
                addrs.retain(|a| !lost.contains(a));
            }
        }
        for (name, gained) in &diff.gained {
            if let Some(addrs) = self.interfaces.get_mut(name) {
                addrs.extend(gained.iter().copied());
            }
        }
        for (name, addrs) in &diff.appeared {
            self.interfaces.insert(name.clone(), addrs.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::InterfaceKind;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn from_snapshots_keeps_first_of_duplicate_names() {
        let map = ActiveInterfaceMap::from_snapshots(&[
            InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, [ip("10.0.0.5")]),
            InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, [ip("10.0.0.6")]),
        ]);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("eth0"), Some(&[ip("10.0.0.5")][..]));
    }

    #[test]
    fn clear_returns_names_in_order() {
        let mut map = ActiveInterfaceMap::from_snapshots(&[
            InterfaceSnapshot::new("wlan0", InterfaceKind::Wireless, [ip("192.168.1.10")]),
            InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, [ip("10.0.0.5")]),
        ]);

        assert_eq!(map.clear(), vec!["eth0".to_string(), "wlan0".to_string()]);
        assert!(map.is_empty());
    }

    #[test]
    fn apply_updates_every_section() {
        let mut map = ActiveInterfaceMap::from_snapshots(&[
            InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, [ip("10.0.0.5"), ip("10.0.0.6")]),
            InterfaceSnapshot::new("eth1", InterfaceKind::Ethernet, [ip("10.1.0.5")]),
        ]);
        let diff = InterfaceDiff {
            dead: vec![("eth1".to_string(), vec![ip("10.1.0.5")])],
            lost: vec![("eth0".to_string(), vec![ip("10.0.0.5")])],
            gained: vec![("eth0".to_string(), vec![ip("10.0.0.7")])],
            appeared: vec![("wlan0".to_string(), vec![ip("192.168.1.10")])],
        };

        map.apply(&diff);

        assert!(!map.contains("eth1"));
        assert_eq!(map.get("eth0"), Some(&[ip("10.0.0.6"), ip("10.0.0.7")][..]));
        assert_eq!(map.get("wlan0"), Some(&[ip("192.168.1.10")][..]));
    }
}
