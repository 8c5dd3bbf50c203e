//! Platform query seams for connection details.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use thiserror::Error;

use super::ConnectionInfo;

/// Error type for connection-detail queries.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The helper program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Program that was invoked.
        program: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The helper program ran but reported failure.
    #[error("{program} exited with {status}")]
    CommandFailed {
        /// Program that was invoked.
        program: &'static str,
        /// Exit status description.
        status: String,
    },

    /// Interface enumeration failed while resolving the address.
    #[error("Failed to resolve interface: {0}")]
    Enumeration(#[from] crate::network::EnumerationError),
}

/// Resolves the connection details of the interface holding an address.
///
/// Implementations may block for a long time; callers run them on the
/// blocking pool with a timeout.
pub trait ConnectionInfoLookup: Send + Sync {
    /// Looks up the details for `address`.
    ///
    /// An address that no interface holds resolves to
    /// [`ConnectionInfo::disconnected`], not an error.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the platform query fails.
    fn lookup(&self, address: IpAddr) -> Result<ConnectionInfo, LookupError>;
}

/// Reports the wireless details of every wireless interface at once.
pub trait WifiInfoSource: Send + Sync {
    /// Returns a map of interface name to details. Wired interfaces are
    /// absent from the map.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the platform query fails.
    fn wifi_info_by_interface(&self) -> Result<HashMap<String, ConnectionInfo>, LookupError>;
}

impl<T: ConnectionInfoLookup + ?Sized> ConnectionInfoLookup for Arc<T> {
    fn lookup(&self, address: IpAddr) -> Result<ConnectionInfo, LookupError> {
        (**self).lookup(address)
    }
}

impl<T: WifiInfoSource + ?Sized> WifiInfoSource for Arc<T> {
    fn wifi_info_by_interface(&self) -> Result<HashMap<String, ConnectionInfo>, LookupError> {
        (**self).wifi_info_by_interface()
    }
}
