//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Polling and event timing
    #[serde(default)]
    pub monitor: MonitorSection,

    /// Interface filter configuration
    #[serde(default)]
    pub filter: FilterSection,

    /// Captive portal probing
    #[serde(default)]
    pub captive: CaptiveSection,

    /// Socket-creation knobs
    #[serde(default)]
    pub network: NetworkSection,
}

/// Monitoring configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Polling interval in seconds
    pub poll_interval: Option<u64>,

    /// Debounce before up events, in milliseconds (0 disables)
    pub up_event_delay_ms: Option<u64>,

    /// Settle delay carried by the first up event, in milliseconds
    pub settle_delay_ms: Option<u64>,

    /// Poll gap multiple that signals resume from standby
    pub standby_factor: Option<u32>,

    /// Poll Wi-Fi associations for access point changes
    #[serde(default)]
    pub track_wifi: bool,

    /// Timeout for Wi-Fi and connection-info queries, in seconds
    pub lookup_timeout: Option<u64>,

    /// Native fault messages known to be harmless (replaces the built-in list)
    pub benign_faults: Option<Vec<String>>,

    /// Watch the resolver configuration for name server changes
    pub track_dns: Option<bool>,

    /// Resolver configuration file
    pub resolv_conf: Option<String>,
}

/// Interface filter configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Regex patterns for interfaces to include
    #[serde(default)]
    pub include: Vec<String>,

    /// Regex patterns for interfaces to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Exclude virtual interfaces
    #[serde(default)]
    pub exclude_virtual: bool,
}

/// Captive portal configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptiveSection {
    /// Probe for captive portals when connectivity changes (default: true)
    pub enabled: Option<bool>,

    /// URL expected to answer `204 No Content` on an open network
    pub probe_url: Option<String>,

    /// Probe timeout in seconds
    pub timeout: Option<u64>,
}

/// Socket-creation knobs.
///
/// Kept as raw values: malformed entries fall back to defaults with a
/// warning instead of rejecting the file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSection {
    /// Number of ports tried when binding
    pub bind_retries: Option<toml::Value>,

    /// Lowest port of the bind range
    pub min_port: Option<toml::Value>,

    /// Highest port of the bind range
    pub max_port: Option<toml::Value>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# netcfg-watch configuration file

[monitor]
# Polling interval in seconds (default: 10)
poll_interval = 10

# Wait this long before announcing new connectivity, in milliseconds.
# 0 disables the wait; the first up event then carries settle_delay_ms.
# up_event_delay_ms = 0

# Delay carried by the first up event of a batch, in milliseconds (default: 500)
# settle_delay_ms = 500

# A poll gap larger than poll_interval * standby_factor means the host slept
# and every interface is reported down (default: 4)
# standby_factor = 4

# Report access point changes that keep the same address
# track_wifi = false

# Timeout for Wi-Fi queries in seconds (default: 10)
# lookup_timeout = 10

# Native enumeration faults that are known to be harmless
# benign_faults = ["Element not found", "No such device"]

# Watch the resolver configuration for name server changes (default: true on Unix)
# track_dns = true
# resolv_conf = "/etc/resolv.conf"

[filter]
# Regex patterns for interfaces to include (empty = all)
# Note: CLI patterns REPLACE these entirely (not merged)
# include = ["^eth", "^wlan"]

# Regex patterns for interfaces to exclude
# Note: CLI patterns REPLACE these entirely (not merged)
# exclude = ["^docker", "^veth"]

# Exclude virtual interfaces (bridges, tunnels, hypervisor adapters)
exclude_virtual = true

[captive]
# Probe for captive portals whenever connectivity changes
# enabled = true
# probe_url = "http://connectivitycheck.gstatic.com/generate_204"
# timeout = 5

[network]
# Socket creation; malformed values fall back to the defaults
# bind_retries = 50
# min_port = 5000
# max_port = 6000
"#
    .to_string()
}
