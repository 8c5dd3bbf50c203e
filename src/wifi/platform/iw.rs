//! Linux wireless details via `iw dev <name> link`.

use std::collections::HashMap;
use std::net::IpAddr;
use std::process::Command;
use std::sync::Arc;

use super::interface_holding;
use crate::network::{InterfaceEnumerator, InterfaceSnapshot};
use crate::wifi::{ConnectionInfo, ConnectionInfoLookup, LookupError, WifiInfoSource};

const PROGRAM: &str = "iw";

/// Wireless details from the `iw` utility.
///
/// Interfaces are resolved through the given enumerator; only those
/// classified as wireless are queried.
pub struct IwWifi {
    enumerator: Arc<dyn InterfaceEnumerator>,
}

impl IwWifi {
    #[must_use]
    pub fn new(enumerator: Arc<dyn InterfaceEnumerator>) -> Self {
        Self { enumerator }
    }

    fn link_info(interface: &InterfaceSnapshot) -> Result<ConnectionInfo, LookupError> {
        if !interface.kind.is_wireless() {
            return Ok(ConnectionInfo::wired());
        }

        let output = Command::new(PROGRAM)
            .args(["dev", &interface.name, "link"])
            .output()
            .map_err(|source| LookupError::Spawn {
                program: PROGRAM,
                source,
            })?;

        if !output.status.success() {
            return Err(LookupError::CommandFailed {
                program: PROGRAM,
                status: output.status.to_string(),
            });
        }

        Ok(parse_link(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl ConnectionInfoLookup for IwWifi {
    fn lookup(&self, address: IpAddr) -> Result<ConnectionInfo, LookupError> {
        match interface_holding(&*self.enumerator, address)? {
            Some(interface) => Self::link_info(&interface),
            None => Ok(ConnectionInfo::disconnected()),
        }
    }
}

impl WifiInfoSource for IwWifi {
    fn wifi_info_by_interface(&self) -> Result<HashMap<String, ConnectionInfo>, LookupError> {
        self.enumerator
            .enumerate()?
            .into_iter()
            .filter(|i| i.kind.is_wireless())
            .map(|i| Self::link_info(&i).map(|info| (i.name, info)))
            .collect()
    }
}

impl std::fmt::Debug for IwWifi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IwWifi").finish_non_exhaustive()
    }
}

/// Parses `iw dev <name> link` output.
///
/// ```text
/// Connected to aa:bb:cc:dd:ee:ff (on wlan0)
///         SSID: HomeNet
///         freq: 5180
/// ```
pub(crate) fn parse_link(output: &str) -> ConnectionInfo {
    let mut bssid = None;
    let mut ssid = None;

    for line in output.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("Connected to ") {
            bssid = rest.split_whitespace().next().map(str::to_ascii_lowercase);
        } else if let Some(rest) = line.strip_prefix("SSID:") {
            ssid = Some(rest.trim().to_string());
        }
    }

    match (ssid, bssid) {
        (Some(ssid), Some(bssid)) => ConnectionInfo::wireless(ssid, bssid),
        _ => ConnectionInfo::wireless_disconnected(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_associated_link() {
        let output = "Connected to AA:BB:CC:DD:EE:FF (on wlan0)\n\
                      \tSSID: HomeNet\n\
                      \tfreq: 5180\n\
                      \tsignal: -52 dBm\n";

        let info = parse_link(output);

        assert_eq!(info, ConnectionInfo::wireless("HomeNet", "aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn not_connected_is_wireless_but_disconnected() {
        let info = parse_link("Not connected.\n");

        assert!(info.is_wireless());
        assert!(!info.is_connected());
    }

    #[test]
    fn ssid_with_spaces_is_kept_whole() {
        let output = "Connected to 00:11:22:33:44:55 (on wlp2s0)\n\tSSID: Coffee Shop Guest\n";
        assert_eq!(parse_link(output).ssid(), Some("Coffee Shop Guest"));
    }
}
