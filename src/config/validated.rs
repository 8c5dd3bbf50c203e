//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::monitor::{DEFAULT_BENIGN_FAULTS, UpEventPolicy, WatcherConfig};
use crate::network::InterfaceKind;
use crate::network::filter::{FilterChain, KindFilter, NameRegexFilter};
use crate::socket::NetworkSettings;

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::knobs;
use super::toml::TomlConfig;

/// Captive-portal probe settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptiveSettings {
    /// URL expected to answer `204 No Content` on an open network.
    pub probe_url: Url,
    /// Probe timeout.
    pub timeout: Duration,
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Watcher tuning
    pub watcher: WatcherConfig,

    /// Interface filter
    pub filter: FilterChain,

    /// Captive-portal probing, `None` when disabled
    pub captive: Option<CaptiveSettings>,

    /// Resolver configuration to watch, `None` when disabled
    pub resolv_conf: Option<PathBuf>,

    /// Socket-creation knobs
    pub network: NetworkSettings,

    /// Print events as JSON lines
    pub json: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let captive = self
            .captive
            .as_ref()
            .map_or_else(|| "off".to_string(), |c| c.probe_url.to_string());
        let dns = self
            .resolv_conf
            .as_ref()
            .map_or_else(|| "off".to_string(), |p| p.display().to_string());

        write!(
            f,
            "Config {{ poll_interval: {}s, standby_factor: {}, track_wifi: {}, captive: {}, \
             dns: {}, filters: {}, ports: {}-{} }}",
            self.watcher.poll_interval.as_secs(),
            self.watcher.standby_factor,
            self.watcher.track_wifi,
            captive,
            dns,
            self.filter.len(),
            self.network.min_port,
            self.network.max_port,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Regex patterns are invalid
    /// - A duration is zero where that is meaningless
    /// - The standby factor is too small
    /// - The captive probe URL is invalid
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let watcher = Self::build_watcher_config(cli, toml)?;
        let filter = Self::build_filter(cli, toml)?;
        let captive = Self::resolve_captive(cli, toml)?;
        let resolv_conf = Self::resolve_dns(toml);
        let network = toml.map_or_else(NetworkSettings::default, |t| {
            knobs::network_settings(&t.network)
        });

        Ok(Self {
            watcher,
            filter,
            captive,
            resolv_conf,
            network,
            json: cli.json,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn build_watcher_config(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<WatcherConfig, ConfigError> {
        let monitor = toml.map(|t| &t.monitor);

        // Priority: CLI explicit > TOML > default
        let poll_secs = cli
            .poll_interval
            .or_else(|| monitor.and_then(|m| m.poll_interval))
            .unwrap_or(defaults::POLL_INTERVAL_SECS);
        if poll_secs == 0 {
            return Err(ConfigError::zero_duration("poll_interval"));
        }

        let up_event_delay_ms = cli
            .up_event_delay_ms
            .or_else(|| monitor.and_then(|m| m.up_event_delay_ms))
            .unwrap_or(defaults::UP_EVENT_DELAY_MS);
        let settle_delay_ms = monitor
            .and_then(|m| m.settle_delay_ms)
            .unwrap_or(defaults::SETTLE_DELAY_MS);

        let standby_factor = monitor
            .and_then(|m| m.standby_factor)
            .unwrap_or(defaults::STANDBY_FACTOR);
        if standby_factor < defaults::MIN_STANDBY_FACTOR {
            return Err(ConfigError::InvalidValue {
                field: "standby_factor",
                reason: format!("must be at least {}", defaults::MIN_STANDBY_FACTOR),
            });
        }

        let lookup_secs = monitor
            .and_then(|m| m.lookup_timeout)
            .unwrap_or(defaults::LOOKUP_TIMEOUT_SECS);
        if lookup_secs == 0 {
            return Err(ConfigError::zero_duration("lookup_timeout"));
        }

        let benign_faults = monitor
            .and_then(|m| m.benign_faults.clone())
            .unwrap_or_else(|| DEFAULT_BENIGN_FAULTS.iter().map(ToString::to_string).collect());

        Ok(WatcherConfig {
            poll_interval: Duration::from_secs(poll_secs),
            up_events: UpEventPolicy::new(
                Duration::from_millis(up_event_delay_ms),
                Duration::from_millis(settle_delay_ms),
            ),
            standby_factor,
            // Flags only enable
            track_wifi: cli.track_wifi || monitor.is_some_and(|m| m.track_wifi),
            benign_faults,
            lookup_timeout: Duration::from_secs(lookup_secs),
        })
    }

    fn build_filter(cli: &Cli, toml: Option<&TomlConfig>) -> Result<FilterChain, ConfigError> {
        let mut filter = FilterChain::new();

        let exclude_virtual = cli.exclude_virtual || toml.is_some_and(|t| t.filter.exclude_virtual);
        if exclude_virtual {
            filter = filter.exclude(KindFilter::new([InterfaceKind::Virtual]));
        }

        // CLI patterns replace TOML patterns, includes and excludes independently
        let includes = if cli.include_interfaces.is_empty() {
            toml.map_or(&[][..], |t| t.filter.include.as_slice())
        } else {
            cli.include_interfaces.as_slice()
        };
        for pattern in includes {
            filter = filter.include(compile(pattern)?);
        }

        let excludes = if cli.exclude_interfaces.is_empty() {
            toml.map_or(&[][..], |t| t.filter.exclude.as_slice())
        } else {
            cli.exclude_interfaces.as_slice()
        };
        for pattern in excludes {
            filter = filter.exclude(compile(pattern)?);
        }

        Ok(filter)
    }

    fn resolve_captive(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<CaptiveSettings>, ConfigError> {
        let captive = toml.map(|t| &t.captive);
        let enabled = !cli.no_captive_check && captive.and_then(|c| c.enabled).unwrap_or(true);
        if !enabled {
            return Ok(None);
        }

        let url_str = cli
            .captive_probe_url
            .as_deref()
            .or_else(|| captive.and_then(|c| c.probe_url.as_deref()))
            .unwrap_or(defaults::CAPTIVE_PROBE_URL);
        let probe_url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(probe_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        let timeout_secs = captive
            .and_then(|c| c.timeout)
            .unwrap_or(defaults::CAPTIVE_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::zero_duration("captive.timeout"));
        }

        Ok(Some(CaptiveSettings {
            probe_url,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }

    fn resolve_dns(toml: Option<&TomlConfig>) -> Option<PathBuf> {
        let monitor = toml.map(|t| &t.monitor);
        let enabled = monitor.and_then(|m| m.track_dns).unwrap_or(cfg!(unix));
        if !enabled {
            return None;
        }
        let path = monitor
            .and_then(|m| m.resolv_conf.as_deref())
            .unwrap_or(defaults::RESOLV_CONF);
        Some(PathBuf::from(path))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn compile(pattern: &str) -> Result<NameRegexFilter, ConfigError> {
    NameRegexFilter::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source: e,
    })
}
