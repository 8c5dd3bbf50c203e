//! Application execution logic.
//!
//! This module wires the platform enumerator, Wi-Fi queries, captive portal
//! probe and resolver watcher into a [`NetworkManager`], then reports every
//! change it delivers until a shutdown signal arrives or the watcher fails.

use std::net::IpAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::signal;
use tokio_stream::StreamExt;

use netcfg_watch::config::ValidatedConfig;
use netcfg_watch::dispatch::{ChannelListener, ListenerError};
use netcfg_watch::manager::{AddressLookup, ManagerError, NetworkManager};
use netcfg_watch::monitor::{ChangeEvent, HttpProbe, ResolvConf, WatchError};
use netcfg_watch::network::InterfaceEnumerator;
use netcfg_watch::network::filter::FilteredEnumerator;
use netcfg_watch::network::platform::PlatformEnumerator;
use netcfg_watch::socket::{NetworkSettings, bind_udp};
use netcfg_watch::task::local_host_with_timeout;
use netcfg_watch::wifi::ConnectionInfo;
use netcfg_watch::wifi::platform::PlatformWifi;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to assemble the network manager.
    #[error("Failed to build network manager: {0}")]
    Manager(#[from] ManagerError),

    /// Failed to create the captive portal probe client.
    #[error("Failed to create captive portal probe: {0}")]
    CaptiveProbe(#[source] reqwest::Error),

    /// The watcher stopped on a fault it could not recover from.
    #[error("Network watcher failed: {0}")]
    Watcher(#[from] WatchError),

    /// The event stream ended while the manager was running.
    #[error("Event stream terminated unexpectedly")]
    StreamTerminated,
}

/// How delivered events are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    /// One log line per event.
    Log,
    /// One JSON object per line on stdout.
    Json,
}

/// Per-address check run in the background for every new address: logs
/// the connection details and verifies a UDP socket can be bound there.
struct AddressReporter {
    settings: NetworkSettings,
}

impl AddressLookup for AddressReporter {
    fn lookup(&self, address: IpAddr, info: &ConnectionInfo) -> Result<(), ListenerError> {
        tracing::info!(address = %address, connection = %info, "Connection details");
        let socket = bind_udp(address, self.settings.min_port, &self.settings)?;
        let port = socket.local_addr()?.port();
        tracing::debug!(address = %address, port, "Address accepts UDP sockets");
        Ok(())
    }

    fn name(&self) -> &str {
        "address-reporter"
    }
}

/// Executes the main application loop.
///
/// This function:
/// 1. Creates the filtered platform enumerator
/// 2. Builds the network manager with the configured collaborators
/// 3. Subscribes a channel listener, which starts watching
/// 4. Reports events until shutdown signal (Ctrl+C/SIGTERM) or watcher failure
///
/// # Errors
///
/// Returns an error if:
/// - The captive portal probe client cannot be created
/// - The watcher stops on an unknown native fault
/// - The event stream terminates unexpectedly
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires:
/// - Platform-specific network APIs
/// - Real async runtime with signal handling
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let output = if config.json { Output::Json } else { Output::Log };
    match local_host_with_timeout(config.watcher.lookup_timeout).await {
        Some(ip) => tracing::info!(address = %ip, "Preferred outbound address"),
        None => tracing::info!("No outbound route available yet"),
    }
    let manager = build_manager(config)?;

    let (listener, mut events) = ChannelListener::channel();
    manager.add_listener(Arc::new(listener));

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                break;
            }

            () = manager.watcher_stopped() => break,

            event = events.next() => {
                let Some(event) = event else {
                    manager.shutdown().await?;
                    return Err(RunError::StreamTerminated);
                };
                report(&event, output);
            }
        }
    }

    manager.shutdown().await?;
    Ok(())
}

/// Assembles the manager from validated configuration.
fn build_manager(config: ValidatedConfig) -> Result<NetworkManager, RunError> {
    let enumerator: Arc<dyn InterfaceEnumerator> =
        Arc::new(FilteredEnumerator::new(PlatformEnumerator::new(), config.filter));
    let wifi = Arc::new(PlatformWifi::new(Arc::clone(&enumerator)));

    let mut builder = NetworkManager::builder(enumerator)
        .with_config(config.watcher.clone())
        .with_connection_info(wifi.clone())
        .with_address_lookup(Arc::new(AddressReporter {
            settings: config.network,
        }));

    if config.watcher.track_wifi {
        builder = builder.with_wifi_source(wifi);
    }

    if let Some(captive) = &config.captive {
        let probe = HttpProbe::new(captive.probe_url.clone(), captive.timeout)
            .map_err(RunError::CaptiveProbe)?;
        tracing::info!(url = %captive.probe_url, "Captive portal probing enabled");
        builder = builder.with_captive_check(Arc::new(probe));
    }

    if let Some(path) = &config.resolv_conf {
        tracing::info!(path = %path.display(), "Watching resolver configuration");
        builder = builder.with_dns_source(Arc::new(ResolvConf::new(path)));
    }

    Ok(builder.build()?)
}

/// Renders one event for output.
fn render(event: &ChangeEvent, output: Output) -> Result<String, serde_json::Error> {
    match output {
        Output::Log => Ok(event.to_string()),
        Output::Json => serde_json::to_string(event),
    }
}

fn report(event: &ChangeEvent, output: Output) {
    match (output, render(event, output)) {
        (Output::Log, Ok(line)) => tracing::info!(event = %line, "Network change"),
        (Output::Json, Ok(line)) => println!("{line}"),
        (_, Err(error)) => tracing::warn!(event = %event, error = %error, "Failed to serialize event"),
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// A signal source that cannot be installed is logged and never fires.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
