//! Configuration layer for netcfg-watch.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Lenient socket knobs ([`knobs`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! For filter patterns (`include_interfaces`, `exclude_interfaces`), CLI patterns
//! **replace** TOML patterns entirely (not merged). Include and exclude patterns are
//! handled independently.
//!
//! # Boolean Flag Semantics
//!
//! Enabling flags (`--track-wifi`, `--exclude-virtual`) use OR semantics: set in
//! either source means on. `--no-captive-check` always wins over `captive.enabled`.
//!
//! # TOML-Only Options
//!
//! - `monitor.settle_delay_ms`, `monitor.standby_factor`, `monitor.lookup_timeout`,
//!   `monitor.benign_faults`, `monitor.track_dns`, `monitor.resolv_conf`
//! - `captive.timeout`
//! - The whole `[network]` section

mod cli;
pub mod defaults;
mod error;
pub mod knobs;
mod toml;
mod validated;


pub use cli::{Cli, Command};
pub use error::ConfigError;
pub use toml::{
    CaptiveSection, FilterSection, MonitorSection, NetworkSection, TomlConfig,
    default_config_template,
};
pub use validated::{CaptiveSettings, ValidatedConfig, write_default_config};
