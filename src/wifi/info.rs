//! Per-address connection details.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wireless association details for the interface holding an address.
///
/// Values are immutable once built; the cache replaces whole entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConnectionInfo {
    is_wireless: bool,
    ssid: Option<String>,
    bssid: Option<String>,
    connected: bool,
}

impl ConnectionInfo {
    /// A wireless interface associated with an access point.
    #[must_use]
    pub fn wireless(ssid: impl Into<String>, bssid: impl Into<String>) -> Self {
        Self {
            is_wireless: true,
            ssid: Some(ssid.into()),
            bssid: Some(bssid.into()),
            connected: true,
        }
    }

    /// A wireless interface that is not associated.
    #[must_use]
    pub const fn wireless_disconnected() -> Self {
        Self {
            is_wireless: true,
            ssid: None,
            bssid: None,
            connected: false,
        }
    }

    /// A wired (non-wireless) interface with a live link.
    #[must_use]
    pub const fn wired() -> Self {
        Self {
            is_wireless: false,
            ssid: None,
            bssid: None,
            connected: true,
        }
    }

    /// The "not connected" value used when nothing could be determined.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            is_wireless: false,
            ssid: None,
            bssid: None,
            connected: false,
        }
    }

    #[must_use]
    pub const fn is_wireless(&self) -> bool {
        self.is_wireless
    }

    #[must_use]
    pub fn ssid(&self) -> Option<&str> {
        self.ssid.as_deref()
    }

    #[must_use]
    pub fn bssid(&self) -> Option<&str> {
        self.bssid.as_deref()
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_wireless, self.connected) {
            (true, true) => write!(
                f,
                "wifi ssid={} bssid={}",
                self.ssid.as_deref().unwrap_or("?"),
                self.bssid.as_deref().unwrap_or("?")
            ),
            (true, false) => write!(f, "wifi (not associated)"),
            (false, true) => write!(f, "wired"),
            (false, false) => write!(f, "not connected"),
        }
    }
}
