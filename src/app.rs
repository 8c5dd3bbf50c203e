//! Process-level helpers for the daemon: exit codes, logging setup and
//! hints printed after a configuration error.

use netcfg_watch::config::ConfigError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit codes reported by `netcfg-watch`.
pub mod exit_code {
    use std::process::ExitCode;

    /// Clean shutdown, or `init` wrote the template.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Bad arguments or an unusable configuration file (1).
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// The runtime could not start or the watcher hit an unknown fault (2).
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Follows a configuration error with a suggestion, where one helps.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::FileRead { .. } | ConfigError::TomlParse(_) => {
            eprintln!("\nRun 'netcfg-watch init' to generate a configuration template.");
        }
        ConfigError::InvalidRegex { .. } => {
            eprintln!("\nInterface patterns are regular expressions, e.g. '^eth' or '^wlan[0-9]$'.");
        }
        ConfigError::InvalidUrl { .. } => {
            eprintln!("\nThe captive portal probe URL must be an http:// or https:// address.");
        }
        _ => {}
    }
}

/// Installs the log subscriber: INFO, or DEBUG with `--verbose`.
/// `RUST_LOG` takes precedence over both.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
