//! Monitor layer for detecting network configuration changes.
//!
//! This module provides types and functions for:
//! - Representing change events ([`ChangeEvent`], [`ChangeKind`]) and
//!   their destination ([`EventSink`])
//! - Tracking active interfaces ([`ActiveInterfaceMap`])
//! - Detecting changes between snapshots ([`diff`], [`InterfaceDiff`])
//! - Delaying up events ([`UpEventPolicy`])
//! - Captive-portal and resolver checks ([`captive`], [`dns`])
//! - Error handling ([`WatchError`], [`FaultClass`])
//! - The polling loop ([`Watcher`], [`WatcherConfig`])

mod active;
pub mod captive;
mod debounce;
mod diff;
pub mod dns;
mod error;
mod event;
mod watcher;

pub use active::ActiveInterfaceMap;
pub use captive::{CaptivePortalCheck, HttpProbe, NeverRestricted};
pub use debounce::UpEventPolicy;
pub use diff::{InterfaceDiff, diff};
pub use dns::{DnsConfigSource, ResolvConf};
pub use error::{DEFAULT_BENIGN_FAULTS, FaultClass, WatchError, classify};
pub use event::{CAPTIVE_PORTAL_SOURCE, ChangeEvent, ChangeKind, DNS_SOURCE, EventSink};
pub use watcher::{Watcher, WatcherConfig};
