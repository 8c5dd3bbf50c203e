//! Core network types for interface representation.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Network interface type classification.
///
/// Used for logging, filtering, and the loopback check. The watcher does not
/// depend on specific values beyond [`InterfaceKind::Loopback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// Physical Ethernet interface.
    Ethernet,
    /// Wireless (Wi-Fi) interface.
    Wireless,
    /// Loopback interface (localhost).
    Loopback,
    /// Virtual interface (tunnels, bridges, hypervisor adapters, ...).
    Virtual,
    /// Unknown or other type, preserving the original type code for debugging.
    Other(u32),
}

impl InterfaceKind {
    /// Returns true if this is a virtual interface.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual)
    }

    /// Returns true if this is a loopback interface.
    #[must_use]
    pub const fn is_loopback(&self) -> bool {
        matches!(self, Self::Loopback)
    }

    /// Returns true if this is a wireless interface.
    #[must_use]
    pub const fn is_wireless(&self) -> bool {
        matches!(self, Self::Wireless)
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ethernet => write!(f, "ethernet"),
            Self::Wireless => write!(f, "wireless"),
            Self::Loopback => write!(f, "loopback"),
            Self::Virtual => write!(f, "virtual"),
            Self::Other(code) => write!(f, "other({code})"),
        }
    }
}

/// Returns true for IPv4 `169.254.0.0/16` and IPv6 `fe80::/10` addresses.
#[must_use]
pub const fn is_link_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

/// Stable identity of an interface across snapshots.
///
/// OS handles are not reused across topology changes, so the name alone is
/// not enough: a re-created interface keeps its name but gets a new index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceKey {
    /// Interface name.
    pub name: String,
    /// OS interface index, when the platform reports one.
    pub index: Option<u32>,
}

/// A snapshot of a single network interface at a point in time.
///
/// # Invariants
///
/// - Never contains link-local addresses; [`InterfaceSnapshot::new`] strips them.
/// - Addresses are unique and keep the order the OS reported them in.
///
/// # Equality
///
/// Two snapshots are equal if every field matches, address order included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSnapshot {
    /// The interface name (e.g., "eth0", "Wi-Fi").
    pub name: String,
    /// OS interface index, if known.
    pub index: Option<u32>,
    /// The type of interface.
    pub kind: InterfaceKind,
    /// Whether the OS reports the interface as operationally up.
    pub is_up: bool,
    addresses: Vec<IpAddr>,
}

impl InterfaceSnapshot {
    /// Creates a new snapshot of an up interface with no known index.
    ///
    /// Link-local and duplicate addresses are dropped.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: InterfaceKind,
        addresses: impl IntoIterator<Item = IpAddr>,
    ) -> Self {
        let mut unique: Vec<IpAddr> = Vec::new();
        for addr in addresses {
            if !is_link_local(&addr) && !unique.contains(&addr) {
                unique.push(addr);
            }
        }

        Self {
            name: name.into(),
            index: None,
            kind,
            is_up: true,
            addresses: unique,
        }
    }

    /// Sets the OS interface index.
    #[must_use]
    pub const fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the operational state.
    #[must_use]
    pub const fn with_up(mut self, is_up: bool) -> Self {
        self.is_up = is_up;
        self
    }

    /// Bound addresses, link-local excluded.
    #[must_use]
    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    /// Returns true if this interface has any bound address.
    #[must_use]
    pub fn has_addresses(&self) -> bool {
        !self.addresses.is_empty()
    }

    /// Returns true if the interface kind is loopback.
    #[must_use]
    pub const fn is_loopback(&self) -> bool {
        self.kind.is_loopback()
    }

    /// Returns the identity used to memoize per-interface checks.
    #[must_use]
    pub fn key(&self) -> InterfaceKey {
        InterfaceKey {
            name: self.name.clone(),
            index: self.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    mod link_local {
        use super::*;

        #[test]
        fn ipv4_link_local_detected() {
            assert!(is_link_local(&ip("169.254.10.20")));
            assert!(!is_link_local(&ip("192.168.1.1")));
        }

        #[test]
        fn ipv6_link_local_detected() {
            assert!(is_link_local(&ip("fe80::1")));
            assert!(is_link_local(&ip("febf::1")));
            assert!(!is_link_local(&ip("fec0::1")));
            assert!(!is_link_local(&ip("2001:db8::1")));
        }
    }

    mod interface_kind {
        use super::*;

        #[test]
        fn loopback_is_loopback() {
            assert!(InterfaceKind::Loopback.is_loopback());
            assert!(!InterfaceKind::Ethernet.is_loopback());
            assert!(!InterfaceKind::Other(24).is_loopback());
        }

        #[test]
        fn display_preserves_other_code() {
            assert_eq!(InterfaceKind::Other(42).to_string(), "other(42)");
            assert_eq!(InterfaceKind::Wireless.to_string(), "wireless");
        }
    }

    mod snapshot {
        use super::*;

        #[test]
        fn new_strips_link_local_addresses() {
            let snapshot = InterfaceSnapshot::new(
                "eth0",
                InterfaceKind::Ethernet,
                [ip("fe80::1"), ip("10.0.0.5"), ip("169.254.1.1")],
            );

            assert_eq!(snapshot.addresses(), &[ip("10.0.0.5")]);
        }

        #[test]
        fn new_drops_duplicates_and_keeps_order() {
            let snapshot = InterfaceSnapshot::new(
                "eth0",
                InterfaceKind::Ethernet,
                [ip("10.0.0.2"), ip("10.0.0.1"), ip("10.0.0.2")],
            );

            assert_eq!(snapshot.addresses(), &[ip("10.0.0.2"), ip("10.0.0.1")]);
        }

        #[test]
        fn defaults_to_up_without_index() {
            let snapshot = InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, []);

            assert!(snapshot.is_up);
            assert_eq!(snapshot.index, None);
            assert!(!snapshot.has_addresses());
        }

        #[test]
        fn key_combines_name_and_index() {
            let a = InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, []).with_index(2);
            let b = InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, []).with_index(7);

            assert_ne!(a.key(), b.key());
            assert_eq!(a.key().name, "eth0");
        }

        #[test]
        fn equality_requires_same_up_state() {
            let up = InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, [ip("10.0.0.1")]);
            let down = up.clone().with_up(false);

            assert_ne!(up, down);
        }
    }
}
