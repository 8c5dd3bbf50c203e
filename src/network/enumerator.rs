//! Interface enumeration trait and error types.

use std::sync::Arc;

use super::InterfaceSnapshot;
use thiserror::Error;

/// Error type for interface enumeration.
///
/// Describes what went wrong without dictating recovery strategy. The
/// watcher classifies these into "skip this cycle" and "fatal" faults.
#[derive(Debug, Error)]
pub enum EnumerationError {
    /// Windows API call failed.
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),

    /// The OS query itself failed (transient).
    #[error("Interface enumeration failed: {0}")]
    Os(#[from] std::io::Error),

    /// Permission denied to access network information.
    #[error("Permission denied: {context}")]
    PermissionDenied {
        /// Additional context about what permission was denied.
        context: String,
    },

    /// Runtime fault raised by the native layer.
    ///
    /// Some of these have known, harmless signatures; anything else is of
    /// unknown scope.
    #[error("Native fault: {message}")]
    Native {
        /// Message reported by the native layer.
        message: String,
    },
}

impl EnumerationError {
    /// Returns true if the fault is an ordinary OS query failure that the
    /// next poll can be expected to recover from.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::Native { .. })
    }
}

/// Trait for enumerating the host's network interfaces.
///
/// # Design
///
/// - Enables dependency injection for testing with mock implementations
/// - Platform-specific implementations live in [`super::platform`]
///
/// # Example
///
/// ```ignore
/// use netcfg_watch::network::{EnumerationError, InterfaceEnumerator, InterfaceSnapshot};
///
/// struct MockEnumerator {
///     snapshots: Vec<Vec<InterfaceSnapshot>>,
///     call_count: std::sync::atomic::AtomicUsize,
/// }
///
/// impl InterfaceEnumerator for MockEnumerator {
///     fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
///         let idx = self.call_count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
///         Ok(self.snapshots.get(idx).cloned().unwrap_or_default())
///     }
/// }
/// ```
pub trait InterfaceEnumerator: Send + Sync {
    /// Enumerates all interfaces with their bound addresses.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerationError`] when:
    /// - The OS query fails (`Os`, or `WindowsApi` on Windows)
    /// - Access to network information is denied (`PermissionDenied`)
    /// - The native layer raises a runtime fault (`Native`)
    ///
    /// # Implementation Notes
    ///
    /// - Return ALL interfaces, loopback included; filtering is done by the caller
    /// - Address order within each interface should be stable across calls
    /// - This is a synchronous, potentially slow OS call
    fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError>;
}

impl<T: InterfaceEnumerator + ?Sized> InterfaceEnumerator for Arc<T> {
    fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
        (**self).enumerate()
    }
}

impl<T: InterfaceEnumerator + ?Sized> InterfaceEnumerator for Box<T> {
    fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
        (**self).enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_fault_is_not_transient() {
        let error = EnumerationError::Native {
            message: "handle table corrupted".to_string(),
        };
        assert!(!error.is_transient());
    }

    #[test]
    fn os_and_permission_faults_are_transient() {
        let os = EnumerationError::Os(std::io::Error::other("netlink busy"));
        let denied = EnumerationError::PermissionDenied {
            context: "sandboxed".to_string(),
        };

        assert!(os.is_transient());
        assert!(denied.is_transient());
    }

    #[test]
    fn native_fault_displays_message() {
        let error = EnumerationError::Native {
            message: "Element not found".to_string(),
        };
        assert_eq!(error.to_string(), "Native fault: Element not found");
    }

    #[test]
    fn permission_denied_displays_context() {
        let error = EnumerationError::PermissionDenied {
            context: "elevated privileges required".to_string(),
        };
        assert!(error.to_string().contains("elevated privileges required"));
    }

    #[test]
    fn arc_delegates_to_inner() {
        struct Fixed;
        impl InterfaceEnumerator for Fixed {
            fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
                Ok(vec![InterfaceSnapshot::new(
                    "eth0",
                    crate::network::InterfaceKind::Ethernet,
                    [],
                )])
            }
        }

        let shared: Arc<dyn InterfaceEnumerator> = Arc::new(Fixed);
        assert_eq!(shared.enumerate().unwrap()[0].name, "eth0");
    }
}
