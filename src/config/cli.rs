//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// netcfg-watch: network configuration watcher
///
/// Watches interfaces, addresses, Wi-Fi associations and captive portals,
/// and logs every change.
#[derive(Debug, Parser)]
#[command(name = "netcfg-watch")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Polling interval in seconds
    #[arg(long = "poll-interval")]
    pub poll_interval: Option<u64>,

    /// Wait before announcing new connectivity, in milliseconds (0 disables)
    #[arg(long = "up-event-delay-ms")]
    pub up_event_delay_ms: Option<u64>,

    /// Report access point changes that keep the same address
    #[arg(long = "track-wifi")]
    pub track_wifi: bool,

    /// Do not probe for captive portals
    #[arg(long = "no-captive-check")]
    pub no_captive_check: bool,

    /// URL expected to answer 204 on an open network
    #[arg(long = "captive-probe-url", value_name = "URL")]
    pub captive_probe_url: Option<String>,

    /// Regex pattern for interfaces to include (can be specified multiple times)
    #[arg(long = "include-interface", value_name = "PATTERN")]
    pub include_interfaces: Vec<String>,

    /// Regex pattern for interfaces to exclude (can be specified multiple times)
    #[arg(long = "exclude-interface", value_name = "PATTERN")]
    pub exclude_interfaces: Vec<String>,

    /// Exclude virtual interfaces (bridges, tunnels, hypervisor adapters)
    #[arg(long = "exclude-virtual")]
    pub exclude_virtual: bool,

    /// Print events as JSON lines instead of log messages
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for netcfg-watch
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "netcfg-watch.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
