//! netcfg-watch: network configuration watcher
//!
//! A library for watching the host's network configuration (interfaces,
//! addresses, Wi-Fi associations, captive portals and resolver settings)
//! and fanning out change events to registered listeners.
//!
//! Start with [`manager::NetworkManager`].

pub mod config;
pub mod dispatch;
pub mod manager;
pub mod monitor;
pub mod network;
pub mod socket;
pub mod task;
pub mod time;
pub mod wifi;
