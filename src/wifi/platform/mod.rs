//! Platform-specific wireless queries.
//!
//! # Platform Support
//!
//! - **Linux**: `iw dev <name> link`
//! - **Windows**: `netsh wlan show interfaces`
//! - **Everything else**: [`Unsupported`], which reports "not connected"

mod iw;
mod netsh;

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

pub use iw::IwWifi;
pub use netsh::NetshWifi;

use crate::network::{EnumerationError, InterfaceEnumerator, InterfaceSnapshot};
use crate::wifi::{ConnectionInfo, ConnectionInfoLookup, LookupError, WifiInfoSource};

/// Fallback for platforms without a wireless query.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl Unsupported {
    /// Same constructor shape as the real queries; the enumerator is unused.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(_enumerator: Arc<dyn InterfaceEnumerator>) -> Self {
        Self
    }
}

impl ConnectionInfoLookup for Unsupported {
    fn lookup(&self, _address: IpAddr) -> Result<ConnectionInfo, LookupError> {
        Ok(ConnectionInfo::disconnected())
    }
}

impl WifiInfoSource for Unsupported {
    fn wifi_info_by_interface(&self) -> Result<HashMap<String, ConnectionInfo>, LookupError> {
        Ok(HashMap::new())
    }
}

/// The wireless query for the current target.
#[cfg(target_os = "linux")]
pub type PlatformWifi = IwWifi;

/// The wireless query for the current target.
#[cfg(windows)]
pub type PlatformWifi = NetshWifi;

/// The wireless query for the current target.
#[cfg(not(any(target_os = "linux", windows)))]
pub type PlatformWifi = Unsupported;

/// Finds the interface currently holding `address`.
fn interface_holding(
    enumerator: &dyn InterfaceEnumerator,
    address: IpAddr,
) -> Result<Option<InterfaceSnapshot>, EnumerationError> {
    Ok(enumerator
        .enumerate()?
        .into_iter()
        .find(|i| i.addresses().contains(&address)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::InterfaceKind;

    struct Fixed(Vec<InterfaceSnapshot>);

    impl InterfaceEnumerator for Fixed {
        fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
            Ok(self.0.clone())
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn finds_interface_by_address() {
        let enumerator = Fixed(vec![
            InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, [ip("10.0.0.5")]),
            InterfaceSnapshot::new("wlan0", InterfaceKind::Wireless, [ip("192.168.1.20")]),
        ]);

        let found = interface_holding(&enumerator, ip("192.168.1.20")).unwrap();

        assert_eq!(found.map(|i| i.name), Some("wlan0".to_string()));
    }

    #[test]
    fn unknown_address_resolves_to_disconnected() {
        let enumerator: Arc<dyn InterfaceEnumerator> = Arc::new(Fixed(vec![]));
        let lookup = IwWifi::new(enumerator);

        let info = lookup.lookup(ip("10.9.9.9")).unwrap();

        assert_eq!(info, ConnectionInfo::disconnected());
    }

    #[test]
    fn wired_interface_skips_wireless_query() {
        let enumerator: Arc<dyn InterfaceEnumerator> = Arc::new(Fixed(vec![
            InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, [ip("10.0.0.5")]),
        ]));
        let lookup = IwWifi::new(enumerator);

        assert_eq!(lookup.lookup(ip("10.0.0.5")).unwrap(), ConnectionInfo::wired());
    }

    #[test]
    fn unsupported_reports_nothing() {
        let unsupported = Unsupported;
        assert_eq!(
            unsupported.lookup(ip("10.0.0.5")).unwrap(),
            ConnectionInfo::disconnected()
        );
        assert!(unsupported.wifi_info_by_interface().unwrap().is_empty());
    }
}
