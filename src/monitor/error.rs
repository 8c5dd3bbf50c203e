//! Error types for the monitor layer.

use crate::network::EnumerationError;
use thiserror::Error;

/// Fault signatures that are known to be harmless by default.
///
/// Drivers report these when an adapter disappears mid-enumeration.
pub const DEFAULT_BENIGN_FAULTS: &[&str] = &["Element not found", "No such device"];

/// Error type for the watcher.
///
/// Only faults of unknown scope end the watcher; everything else is logged
/// and retried on the next poll.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The native layer raised a fault with no known signature.
    #[error("Unknown native fault during interface enumeration: {message}")]
    UnknownNativeFault {
        /// Message reported by the native layer.
        message: String,
    },

    /// The watcher task panicked.
    #[error("Watcher task panicked: {0}")]
    Panicked(String),
}

/// How the watcher treats an enumeration failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Ordinary OS query failure; skip this cycle.
    Transient,
    /// Native fault with a known harmless signature; skip this cycle.
    Benign,
    /// Native fault of unknown scope; stop the watcher.
    Fatal,
}

/// Classifies an enumeration failure.
///
/// A native fault is benign if its message contains any of `benign`.
#[must_use]
pub fn classify(error: &EnumerationError, benign: &[String]) -> FaultClass {
    match error {
        EnumerationError::Native { message } => {
            if benign.iter().any(|signature| message.contains(signature.as_str())) {
                FaultClass::Benign
            } else {
                FaultClass::Fatal
            }
        }
        _ => FaultClass::Transient,
    }
}
