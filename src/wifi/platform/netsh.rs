//! Windows wireless details via `netsh wlan show interfaces`.

use std::collections::HashMap;
use std::net::IpAddr;
use std::process::Command;
use std::sync::Arc;

use super::interface_holding;
use crate::network::InterfaceEnumerator;
use crate::wifi::{ConnectionInfo, ConnectionInfoLookup, LookupError, WifiInfoSource};

const PROGRAM: &str = "netsh";

/// Wireless details from `netsh`.
///
/// `netsh` reports every WLAN interface in one call, keyed by the adapter's
/// friendly name, which is also the name the Windows enumerator reports.
pub struct NetshWifi {
    enumerator: Arc<dyn InterfaceEnumerator>,
}

impl NetshWifi {
    #[must_use]
    pub fn new(enumerator: Arc<dyn InterfaceEnumerator>) -> Self {
        Self { enumerator }
    }

    fn query() -> Result<HashMap<String, ConnectionInfo>, LookupError> {
        let output = Command::new(PROGRAM)
            .args(["wlan", "show", "interfaces"])
            .output()
            .map_err(|source| LookupError::Spawn {
                program: PROGRAM,
                source,
            })?;

        // With the WLAN service stopped netsh exits non-zero: no wireless
        // interfaces to report.
        if !output.status.success() {
            tracing::debug!(status = %output.status, "netsh reported no WLAN service");
            return Ok(HashMap::new());
        }

        Ok(parse_interfaces(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl ConnectionInfoLookup for NetshWifi {
    fn lookup(&self, address: IpAddr) -> Result<ConnectionInfo, LookupError> {
        let Some(interface) = interface_holding(&*self.enumerator, address)? else {
            return Ok(ConnectionInfo::disconnected());
        };
        let mut wlan = Self::query()?;
        Ok(wlan.remove(&interface.name).unwrap_or_else(ConnectionInfo::wired))
    }
}

impl WifiInfoSource for NetshWifi {
    fn wifi_info_by_interface(&self) -> Result<HashMap<String, ConnectionInfo>, LookupError> {
        Self::query()
    }
}

impl std::fmt::Debug for NetshWifi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetshWifi").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Block {
    name: Option<String>,
    connected: bool,
    ssid: Option<String>,
    bssid: Option<String>,
}

impl Block {
    fn finish(self, into: &mut HashMap<String, ConnectionInfo>) {
        let Some(name) = self.name else { return };
        let info = match (self.connected, self.ssid, self.bssid) {
            (true, Some(ssid), Some(bssid)) => ConnectionInfo::wireless(ssid, bssid),
            _ => ConnectionInfo::wireless_disconnected(),
        };
        into.insert(name, info);
    }
}

/// Parses `netsh wlan show interfaces` output into per-interface details.
///
/// Each interface block starts with a `Name` line. Values may contain
/// colons (BSSIDs), so only the first colon separates key from value.
pub(crate) fn parse_interfaces(output: &str) -> HashMap<String, ConnectionInfo> {
    let mut result = HashMap::new();
    let mut current: Option<Block> = None;

    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if key == "name" {
            if let Some(done) = current.take() {
                done.finish(&mut result);
            }
            current = Some(Block {
                name: Some(value.to_string()),
                ..Block::default()
            });
            continue;
        }

        let Some(block) = current.as_mut() else { continue };
        match key.as_str() {
            "state" => block.connected = value.eq_ignore_ascii_case("connected"),
            "ssid" => block.ssid = Some(value.to_string()),
            "bssid" | "ap bssid" => block.bssid = Some(value.to_ascii_lowercase()),
            _ => {}
        }
    }

    if let Some(done) = current {
        done.finish(&mut result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_INTERFACES: &str = "
There are 2 interfaces on the system:

    Name                   : Wi-Fi
    Description            : Intel(R) Wi-Fi 6 AX201 160MHz
    GUID                   : 0b5a2c3e-1111-2222-3333-444455556666
    Physical address       : 10:20:30:40:50:60
    State                  : connected
    SSID                   : HomeNet
    AP BSSID               : AA:BB:CC:DD:EE:FF
    Network type           : Infrastructure
    Signal                 : 92%

    Name                   : Wi-Fi 2
    Description            : USB Wireless Adapter
    State                  : disconnected
";

    #[test]
    fn parses_every_interface_block() {
        let parsed = parse_interfaces(TWO_INTERFACES);

        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed["Wi-Fi"],
            ConnectionInfo::wireless("HomeNet", "aa:bb:cc:dd:ee:ff")
        );
        assert_eq!(parsed["Wi-Fi 2"], ConnectionInfo::wireless_disconnected());
    }

    #[test]
    fn older_bssid_key_is_understood() {
        let output = "Name : Wi-Fi\nState : connected\nSSID : Office\nBSSID : 00:11:22:33:44:55\n";
        assert_eq!(parse_interfaces(output)["Wi-Fi"].bssid(), Some("00:11:22:33:44:55"));
    }

    #[test]
    fn lines_before_first_name_are_ignored() {
        let parsed = parse_interfaces("State : connected\nSSID : Stray\n");
        assert!(parsed.is_empty());
    }
}
