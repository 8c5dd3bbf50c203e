//! Network configuration change events.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Source name used for captive-portal transitions.
pub const CAPTIVE_PORTAL_SOURCE: &str = "captive-portal";

/// Source name used for resolver configuration changes.
pub const DNS_SOURCE: &str = "dns";

/// The kind of configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// An address appeared on an interface.
    AddressUp,
    /// An address disappeared from an interface.
    AddressDown,
    /// An interface became usable.
    IfaceUp,
    /// An interface stopped being usable.
    IfaceDown,
    /// The wireless association behind an address changed.
    WifiInfoChanged,
    /// The resolver configuration changed.
    DnsChange,
    /// Traffic is now being intercepted by a captive portal.
    NowRestrictedByCaptiveWifi,
    /// A captive portal no longer intercepts traffic.
    NoLongerRestrictedByCaptiveWifi,
}

impl ChangeKind {
    /// Returns the `snake_case` name used in logs and serialized events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddressUp => "address_up",
            Self::AddressDown => "address_down",
            Self::IfaceUp => "iface_up",
            Self::IfaceDown => "iface_down",
            Self::WifiInfoChanged => "wifi_info_changed",
            Self::DnsChange => "dns_change",
            Self::NowRestrictedByCaptiveWifi => "now_restricted_by_captive_wifi",
            Self::NoLongerRestrictedByCaptiveWifi => "no_longer_restricted_by_captive_wifi",
        }
    }

    /// Returns true for events announcing new connectivity.
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Self::AddressUp | Self::IfaceUp)
    }

    /// Returns true for events announcing lost connectivity.
    #[must_use]
    pub const fn is_down(self) -> bool {
        matches!(self, Self::AddressDown | Self::IfaceDown)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network configuration change.
///
/// `source` is the interface name for interface and address events, or a
/// fixed tag ([`DNS_SOURCE`], [`CAPTIVE_PORTAL_SOURCE`]) otherwise. Two
/// events are equal when kind, source and address all match; the dispatch
/// queue relies on this to coalesce duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// What changed.
    pub kind: ChangeKind,
    /// Interface name or source tag.
    pub source: String,
    /// The affected address, for address-level events.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<IpAddr>,
}

impl ChangeEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(kind: ChangeKind, source: impl Into<String>, address: Option<IpAddr>) -> Self {
        Self {
            kind,
            source: source.into(),
            address,
        }
    }

    /// Creates an [`ChangeKind::AddressUp`] event.
    #[must_use]
    pub fn address_up(interface: impl Into<String>, address: IpAddr) -> Self {
        Self::new(ChangeKind::AddressUp, interface, Some(address))
    }

    /// Creates an [`ChangeKind::AddressDown`] event.
    #[must_use]
    pub fn address_down(interface: impl Into<String>, address: IpAddr) -> Self {
        Self::new(ChangeKind::AddressDown, interface, Some(address))
    }

    /// Creates an [`ChangeKind::IfaceUp`] event.
    #[must_use]
    pub fn iface_up(interface: impl Into<String>) -> Self {
        Self::new(ChangeKind::IfaceUp, interface, None)
    }

    /// Creates an [`ChangeKind::IfaceDown`] event.
    #[must_use]
    pub fn iface_down(interface: impl Into<String>) -> Self {
        Self::new(ChangeKind::IfaceDown, interface, None)
    }

    /// Creates a [`ChangeKind::WifiInfoChanged`] event.
    #[must_use]
    pub fn wifi_info_changed(interface: impl Into<String>, address: IpAddr) -> Self {
        Self::new(ChangeKind::WifiInfoChanged, interface, Some(address))
    }

    /// Creates a [`ChangeKind::DnsChange`] event.
    #[must_use]
    pub fn dns_change() -> Self {
        Self::new(ChangeKind::DnsChange, DNS_SOURCE, None)
    }

    /// Creates the captive-portal transition event for `restricted`.
    #[must_use]
    pub fn captive_portal(restricted: bool) -> Self {
        let kind = if restricted {
            ChangeKind::NowRestrictedByCaptiveWifi
        } else {
            ChangeKind::NoLongerRestrictedByCaptiveWifi
        };
        Self::new(kind, CAPTIVE_PORTAL_SOURCE, None)
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.source)?;
        if let Some(address) = self.address {
            write!(f, " {address}")?;
        }
        Ok(())
    }
}

/// Receiver of detected changes.
///
/// The watcher hands every event to a sink along with the delay the sink
/// should wait before delivering it.
pub trait EventSink: Send + Sync {
    /// Accepts an event for delivery after `delay`.
    fn fire(&self, event: ChangeEvent, delay: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn constructors_set_kind_and_address() {
        let up = ChangeEvent::address_up("eth0", ip("10.0.0.5"));
        assert_eq!(up.kind, ChangeKind::AddressUp);
        assert_eq!(up.address, Some(ip("10.0.0.5")));

        let down = ChangeEvent::iface_down("wlan0");
        assert_eq!(down.kind, ChangeKind::IfaceDown);
        assert_eq!(down.address, None);
    }

    #[test]
    fn captive_transition_picks_kind() {
        assert_eq!(
            ChangeEvent::captive_portal(true).kind,
            ChangeKind::NowRestrictedByCaptiveWifi
        );
        assert_eq!(
            ChangeEvent::captive_portal(false).kind,
            ChangeKind::NoLongerRestrictedByCaptiveWifi
        );
        assert_eq!(ChangeEvent::captive_portal(true).source, CAPTIVE_PORTAL_SOURCE);
    }

    #[test]
    fn up_and_down_classification() {
        assert!(ChangeKind::AddressUp.is_up());
        assert!(ChangeKind::IfaceUp.is_up());
        assert!(!ChangeKind::WifiInfoChanged.is_up());
        assert!(ChangeKind::IfaceDown.is_down());
        assert!(!ChangeKind::DnsChange.is_down());
    }

    #[test]
    fn equality_covers_all_fields() {
        let a = ChangeEvent::address_up("eth0", ip("10.0.0.5"));
        assert_eq!(a, ChangeEvent::address_up("eth0", ip("10.0.0.5")));
        assert_ne!(a, ChangeEvent::address_up("eth1", ip("10.0.0.5")));
        assert_ne!(a, ChangeEvent::address_down("eth0", ip("10.0.0.5")));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            ChangeEvent::address_down("eth0", ip("10.0.0.5")).to_string(),
            "address_down eth0 10.0.0.5"
        );
        assert_eq!(ChangeEvent::dns_change().to_string(), "dns_change dns");
    }

    #[test]
    fn serializes_snake_case_and_skips_missing_address() {
        let json = serde_json::to_string(&ChangeEvent::iface_up("eth0")).unwrap();
        assert_eq!(json, r#"{"kind":"iface_up","source":"eth0"}"#);

        let json = serde_json::to_string(&ChangeEvent::address_up("eth0", ip("10.0.0.5"))).unwrap();
        assert!(json.contains(r#""kind":"address_up""#));
        assert!(json.contains(r#""address":"10.0.0.5""#));
    }

    #[test]
    fn kind_name_matches_serde_name() {
        let kind = ChangeKind::NoLongerRestrictedByCaptiveWifi;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.as_str()));
    }
}
