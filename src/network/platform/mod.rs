//! Platform-specific interface enumerators.
//!
//! # Platform Support
//!
//! - **Windows**: `GetAdaptersAddresses` via the `windows` crate, with real
//!   operational state and adapter types.
//! - **Everything else**: `getifaddrs` via the `if-addrs` crate; on Linux the
//!   operational state and wireless flag come from sysfs.

mod ifaddrs;
#[cfg(windows)]
mod windows;

pub use ifaddrs::IfAddrsEnumerator;
#[cfg(windows)]
pub use windows::WindowsEnumerator;

/// The preferred enumerator for the current target.
#[cfg(windows)]
pub type PlatformEnumerator = WindowsEnumerator;

/// The preferred enumerator for the current target.
#[cfg(not(windows))]
pub type PlatformEnumerator = IfAddrsEnumerator;
