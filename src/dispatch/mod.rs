//! Event delivery to registered listeners.
//!
//! This module provides:
//! - The listener seam ([`ChangeListener`]) and ready-made listeners
//!   ([`ChannelListener`], [`FnListener`])
//! - Registration ([`ListenerRegistry`])
//! - The queued, single-consumer dispatcher ([`EventDispatcher`])

mod dispatcher;
mod listener;
mod queue;
mod registry;

pub use dispatcher::EventDispatcher;
pub use listener::{ChangeListener, ChannelListener, FnListener, ListenerError, deliver};
pub use queue::PendingEvents;
pub use registry::ListenerRegistry;
