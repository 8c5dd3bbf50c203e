//! Portable interface enumeration using `getifaddrs` (via the `if-addrs` crate).

use std::net::IpAddr;

use crate::network::{EnumerationError, InterfaceEnumerator, InterfaceKind, InterfaceSnapshot};

/// Name prefixes of interfaces created by hypervisors, containers and VPNs.
const VIRTUAL_PREFIXES: &[&str] = &[
    "docker", "veth", "br-", "virbr", "vmnet", "vboxnet", "tun", "tap", "wg", "utun", "zt",
    "tailscale",
];

/// Name prefixes conventionally used for wireless interfaces.
const WIRELESS_PREFIXES: &[&str] = &["wlan", "wlp", "wlx", "wifi", "ath", "ra"];

/// Name prefixes conventionally used for wired interfaces.
const ETHERNET_PREFIXES: &[&str] = &["eth", "enp", "eno", "ens", "enx", "en"];

/// [`InterfaceEnumerator`] backed by `if_addrs::get_if_addrs`.
///
/// `getifaddrs` reports one entry per bound address; entries are grouped by
/// interface name in the order the OS listed them.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfAddrsEnumerator;

impl IfAddrsEnumerator {
    /// Creates a new enumerator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl InterfaceEnumerator for IfAddrsEnumerator {
    fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
        let raw = if_addrs::get_if_addrs()?;
        Ok(group_by_interface(raw.into_iter().map(|iface| {
            let loopback = iface.is_loopback();
            let ip = iface.ip();
            RawAddress {
                name: iface.name,
                index: iface.index,
                loopback,
                ip,
            }
        })))
    }
}

/// One `getifaddrs` entry.
#[derive(Debug, Clone)]
pub(crate) struct RawAddress {
    pub name: String,
    pub index: Option<u32>,
    pub loopback: bool,
    pub ip: IpAddr,
}

/// Folds per-address entries into per-interface snapshots.
pub(crate) fn group_by_interface(entries: impl IntoIterator<Item = RawAddress>) -> Vec<InterfaceSnapshot> {
    let mut order: Vec<(String, Option<u32>, bool)> = Vec::new();
    let mut addresses: Vec<Vec<IpAddr>> = Vec::new();

    for entry in entries {
        if let Some(pos) = order.iter().position(|(name, _, _)| *name == entry.name) {
            order[pos].2 |= entry.loopback;
            addresses[pos].push(entry.ip);
        } else {
            order.push((entry.name, entry.index, entry.loopback));
            addresses.push(vec![entry.ip]);
        }
    }

    order
        .into_iter()
        .zip(addresses)
        .map(|((name, index, loopback), addrs)| {
            let kind = if loopback {
                InterfaceKind::Loopback
            } else {
                classify(&name)
            };
            let is_up = operationally_up(&name);
            let snapshot = InterfaceSnapshot::new(name, kind, addrs).with_up(is_up);
            match index {
                Some(index) => snapshot.with_index(index),
                None => snapshot,
            }
        })
        .collect()
}

/// Guesses the interface kind from sysfs (Linux) or from its name.
fn classify(name: &str) -> InterfaceKind {
    if has_wireless_extensions(name) {
        return InterfaceKind::Wireless;
    }
    classify_by_name(name)
}

pub(crate) fn classify_by_name(name: &str) -> InterfaceKind {
    let lower = name.to_ascii_lowercase();
    if VIRTUAL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        InterfaceKind::Virtual
    } else if WIRELESS_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        InterfaceKind::Wireless
    } else if ETHERNET_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        InterfaceKind::Ethernet
    } else {
        InterfaceKind::Other(0)
    }
}

#[cfg(target_os = "linux")]
fn has_wireless_extensions(name: &str) -> bool {
    std::path::Path::new("/sys/class/net")
        .join(name)
        .join("wireless")
        .exists()
}

#[cfg(not(target_os = "linux"))]
const fn has_wireless_extensions(_name: &str) -> bool {
    false
}

/// Reads `operstate`; `unknown` (common for tunnels and some drivers) counts as up.
#[cfg(target_os = "linux")]
fn operationally_up(name: &str) -> bool {
    let path = std::path::Path::new("/sys/class/net").join(name).join("operstate");
    std::fs::read_to_string(path).map_or(true, |state| state.trim() != "down")
}

/// `getifaddrs` only lists configured interfaces here; treat them as up.
#[cfg(not(target_os = "linux"))]
const fn operationally_up(_name: &str) -> bool {
    true
}
