//! Background task submission and bounded blocking calls.
//!
//! OS queries used by the watcher and the connection-info cache can block
//! for an unbounded time. Everything that might hang goes through
//! [`run_blocking_with_timeout`] so a stuck call costs one blocking thread,
//! never the caller.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::pin::Pin;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::Instrument;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sink for fire-and-forget background work.
///
/// Abstracted so tests can run submitted work inline or count it.
pub trait TaskSubmitter: Send + Sync {
    /// Schedules `task` to run in the background. `name` is used for tracing.
    fn submit(&self, name: &str, task: BoxFuture<'static, ()>);
}

/// [`TaskSubmitter`] that spawns onto a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTaskSubmitter {
    handle: Handle,
}

impl TokioTaskSubmitter {
    /// Creates a submitter spawning onto the given runtime.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl TaskSubmitter for TokioTaskSubmitter {
    fn submit(&self, name: &str, task: BoxFuture<'static, ()>) {
        let span = tracing::debug_span!("task", name = %name);
        drop(self.handle.spawn(task.instrument(span)));
    }
}

/// Runs `f` on the blocking pool, giving up after `timeout`.
///
/// Returns `None` if the call timed out or panicked. A timed-out call keeps
/// running on its blocking thread; its result is discarded.
pub async fn run_blocking_with_timeout<T, F>(name: &str, timeout: Duration, f: F) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(join_error)) => {
            tracing::warn!(task = name, error = %join_error, "Blocking call failed");
            None
        }
        Err(_) => {
            tracing::warn!(task = name, timeout = ?timeout, "Blocking call timed out");
            None
        }
    }
}

/// Asks the OS which local address it would use for outbound traffic.
///
/// Bounded by `timeout`; `None` if the host has no route or the query hangs.
pub async fn local_host_with_timeout(timeout: Duration) -> Option<IpAddr> {
    run_blocking_with_timeout("local-host", timeout, preferred_local_address)
        .await
        .flatten()
}

/// Documentation-range targets; connecting a UDP socket sends no packets.
const ROUTE_PROBE_V4: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 9);
const ROUTE_PROBE_V6: SocketAddr = SocketAddr::new(
    IpAddr::V6(Ipv6Addr::new(0x2001, 0x0db8, 0, 0, 0, 0, 0, 1)),
    9,
);

fn preferred_local_address() -> Option<IpAddr> {
    [ROUTE_PROBE_V4, ROUTE_PROBE_V6]
        .into_iter()
        .find_map(|target| route_source(target).ok())
        .filter(|ip| !ip.is_unspecified())
}

fn route_source(target: SocketAddr) -> std::io::Result<IpAddr> {
    let bind: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind)?;
    socket.connect(target)?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn blocking_call_returns_value() {
        let result = run_blocking_with_timeout("add", Duration::from_secs(5), || 2 + 2).await;
        assert_eq!(result, Some(4));
    }

    #[tokio::test]
    async fn blocking_call_times_out() {
        let (_tx, rx) = std::sync::mpsc::channel::<()>();
        let result = run_blocking_with_timeout("stuck", Duration::from_millis(20), move || {
            // Bounded so the runtime can shut down after the test.
            let _ = rx.recv_timeout(Duration::from_millis(500));
            1
        })
        .await;

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn panicking_blocking_call_yields_none() {
        let result: Option<u8> =
            run_blocking_with_timeout("boom", Duration::from_secs(5), || panic!("native fault"))
                .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn tokio_submitter_runs_task() {
        let submitter = TokioTaskSubmitter::new(Handle::current());
        let ran = Arc::new(AtomicBool::new(false));
        let (tx, rx) = tokio::sync::oneshot::channel();

        let flag = Arc::clone(&ran);
        submitter.submit(
            "flag",
            Box::pin(async move {
                flag.store(true, Ordering::SeqCst);
                let _ = tx.send(());
            }),
        );

        rx.await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn local_host_is_never_unspecified() {
        // Sandboxed hosts may have no route at all; only the shape is checked.
        if let Some(ip) = local_host_with_timeout(Duration::from_secs(5)).await {
            assert!(!ip.is_unspecified());
        }
    }
}
