//! Wireless connection details and the per-address cache.
//!
//! This module provides:
//! - Connection details ([`ConnectionInfo`])
//! - Query seams ([`ConnectionInfoLookup`], [`WifiInfoSource`])
//! - The address-keyed cache ([`ConnectionInfoCache`])
//! - Platform queries ([`platform`])

mod cache;
mod info;
mod lookup;
pub mod platform;

pub use cache::ConnectionInfoCache;
pub use info::ConnectionInfo;
pub use lookup::{ConnectionInfoLookup, LookupError, WifiInfoSource};
