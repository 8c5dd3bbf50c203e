//! UDP socket creation with port retries.

use std::io;
use std::net::{IpAddr, SocketAddr, UdpSocket};

use thiserror::Error;

/// Default number of ports tried before giving up.
pub const DEFAULT_BIND_RETRIES: u32 = 50;
/// Default lower bound of the port range.
pub const DEFAULT_MIN_PORT: u16 = 5000;
/// Default upper bound of the port range.
pub const DEFAULT_MAX_PORT: u16 = 6000;

/// Socket-creation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkSettings {
    /// Number of ports tried, the preferred one included.
    pub bind_retries: u32,
    /// Lowest port tried after the preferred one.
    pub min_port: u16,
    /// Highest port tried before wrapping to `min_port`.
    pub max_port: u16,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            bind_retries: DEFAULT_BIND_RETRIES,
            min_port: DEFAULT_MIN_PORT,
            max_port: DEFAULT_MAX_PORT,
        }
    }
}

impl NetworkSettings {
    /// Returns the port tried after `port`.
    ///
    /// Ports run upward and wrap from `max_port` to `min_port`; a port
    /// outside the range continues from `min_port`.
    #[must_use]
    pub fn next_port(&self, port: u16) -> u16 {
        let (low, high) = if self.min_port <= self.max_port {
            (self.min_port, self.max_port)
        } else {
            (self.max_port, self.min_port)
        };
        if port < low || port >= high {
            low
        } else {
            port + 1
        }
    }
}

/// Errors from socket creation.
#[derive(Debug, Error)]
pub enum SocketError {
    /// Every attempted port failed to bind.
    #[error("Could not bind a UDP socket on {address} after {attempts} attempts: {last_error}")]
    Exhausted {
        /// Local address bound to.
        address: IpAddr,
        /// Number of ports tried.
        attempts: u32,
        /// Error from the last attempt.
        #[source]
        last_error: io::Error,
    },
}

/// Binds a UDP socket on `local_ip`, starting at `preferred_port`.
///
/// On failure the next port from [`NetworkSettings::next_port`] is tried,
/// for at most `bind_retries` attempts in total.
///
/// # Errors
///
/// Returns [`SocketError::Exhausted`] if no attempt succeeded.
pub fn bind_udp(
    local_ip: IpAddr,
    preferred_port: u16,
    settings: &NetworkSettings,
) -> Result<UdpSocket, SocketError> {
    let attempts = settings.bind_retries.max(1);
    let mut port = preferred_port;
    let mut last_error = None;

    for attempt in 1..=attempts {
        match UdpSocket::bind(SocketAddr::new(local_ip, port)) {
            Ok(socket) => {
                tracing::debug!(address = %local_ip, port, attempt, "Bound UDP socket");
                return Ok(socket);
            }
            Err(error) => {
                tracing::trace!(address = %local_ip, port, error = %error, "Port unavailable");
                last_error = Some(error);
                port = settings.next_port(port);
            }
        }
    }

    let last_error = last_error.unwrap_or_else(|| io::Error::other("no bind attempted"));
    tracing::warn!(
        address = %local_ip,
        attempts,
        error = %last_error,
        "Giving up binding UDP socket"
    );
    Err(SocketError::Exhausted {
        address: local_ip,
        attempts,
        last_error,
    })
}
