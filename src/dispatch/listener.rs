//! Change listeners and isolated delivery.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::monitor::ChangeEvent;

/// Error returned by a listener.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives network configuration changes.
///
/// Calls are serialized on the dispatcher task and should return quickly;
/// slow work belongs on a [`crate::task::TaskSubmitter`].
pub trait ChangeListener: Send + Sync {
    /// Handles one change.
    ///
    /// # Errors
    ///
    /// Errors are logged by the dispatcher and otherwise ignored.
    fn configuration_changed(&self, event: &ChangeEvent) -> Result<(), ListenerError>;

    /// Name used when logging delivery failures.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Delivers `event` to `listener`, containing errors and panics.
///
/// Returns true if the listener handled the event.
pub fn deliver(listener: &dyn ChangeListener, event: &ChangeEvent) -> bool {
    match catch_unwind(AssertUnwindSafe(|| listener.configuration_changed(event))) {
        Ok(Ok(())) => true,
        Ok(Err(error)) => {
            tracing::warn!(
                listener = listener.name(),
                event = %event,
                error = %error,
                "Listener failed to handle change"
            );
            false
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(
                listener = listener.name(),
                event = %event,
                panic = %message,
                "Listener panicked while handling change"
            );
            false
        }
    }
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChannelListener {
    /// Creates a listener and the stream its events arrive on.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiverStream<ChangeEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, UnboundedReceiverStream::new(receiver))
    }
}

impl ChangeListener for ChannelListener {
    fn configuration_changed(&self, event: &ChangeEvent) -> Result<(), ListenerError> {
        self.sender
            .send(event.clone())
            .map_err(|_| "event stream closed".into())
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Adapts a closure into a listener.
pub struct FnListener<F> {
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&ChangeEvent) -> Result<(), ListenerError> + Send + Sync,
{
    #[must_use]
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> ChangeListener for FnListener<F>
where
    F: Fn(&ChangeEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn configuration_changed(&self, event: &ChangeEvent) -> Result<(), ListenerError> {
        (self.handler)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> std::fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnListener")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
