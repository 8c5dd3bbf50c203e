//! Network layer: interface snapshots and how they are obtained.
//!
//! This module provides:
//! - Interface snapshots ([`InterfaceSnapshot`], [`InterfaceKind`])
//! - The enumeration seam ([`InterfaceEnumerator`], [`EnumerationError`])
//! - Name/kind filtering ([`filter`])
//! - The cached provider used by the watcher ([`SnapshotProvider`])
//! - Platform-specific enumerators ([`platform`])

mod enumerator;
pub mod filter;
mod interface;
pub mod platform;
mod provider;

pub use enumerator::{EnumerationError, InterfaceEnumerator};
pub use interface::{InterfaceKey, InterfaceKind, InterfaceSnapshot, is_link_local};
pub use provider::SnapshotProvider;
