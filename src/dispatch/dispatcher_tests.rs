//! Tests for the event dispatcher.

use super::*;
use crate::dispatch::{ChangeListener, ChannelListener, FnListener, ListenerError};
use std::net::IpAddr;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn setup() -> (EventDispatcher, Arc<ListenerRegistry>) {
    let registry = Arc::new(ListenerRegistry::new());
    (EventDispatcher::new(Arc::clone(&registry)), registry)
}

fn channel(registry: &ListenerRegistry) -> UnboundedReceiverStream<ChangeEvent> {
    let (listener, stream) = ChannelListener::channel();
    registry.add(Arc::new(listener));
    stream
}

mod without_listeners {
    use super::*;

    #[test]
    fn fire_is_a_no_op() {
        let (dispatcher, _registry) = setup();

        for _ in 0..1_000 {
            dispatcher.fire_change_event(ChangeEvent::iface_up("eth0"), Duration::ZERO);
        }

        assert_eq!(dispatcher.pending(), 0);
        assert!(!dispatcher.is_running());
    }

    #[test]
    fn backlog_is_discarded_once_listeners_leave() {
        let (dispatcher, registry) = setup();
        let listener: Arc<dyn ChangeListener> = Arc::new(ChannelListener::channel().0);
        registry.add(Arc::clone(&listener));
        dispatcher.fire_change_event(ChangeEvent::iface_up("eth0"), Duration::ZERO);
        assert_eq!(dispatcher.pending(), 1);

        registry.remove(&listener);

        assert!(dispatcher.shared.next().is_none());
        assert_eq!(dispatcher.pending(), 0);
    }
}

mod delivery {
    use super::*;

    #[tokio::test]
    async fn delivers_in_order() {
        let (dispatcher, registry) = setup();
        let mut stream = channel(&registry);
        let handle = dispatcher.start(&Handle::current()).unwrap();

        dispatcher.fire_change_event(ChangeEvent::iface_down("eth0"), Duration::ZERO);
        dispatcher.fire_change_event(ChangeEvent::address_up("wlan0", ip("192.168.1.10")), Duration::ZERO);

        assert_eq!(stream.next().await, Some(ChangeEvent::iface_down("eth0")));
        assert_eq!(
            stream.next().await,
            Some(ChangeEvent::address_up("wlan0", ip("192.168.1.10")))
        );

        dispatcher.stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn failing_listener_does_not_block_later_listener() {
        let (dispatcher, registry) = setup();
        registry.add(Arc::new(FnListener::new(
            "failing",
            |_: &ChangeEvent| -> Result<(), ListenerError> { Err("boom".into()) },
        )));
        registry.add(Arc::new(FnListener::new(
            "panicking",
            |_: &ChangeEvent| -> Result<(), ListenerError> { panic!("listener bug") },
        )));
        let mut stream = channel(&registry);
        let _handle = dispatcher.start(&Handle::current()).unwrap();

        dispatcher.fire_change_event(ChangeEvent::dns_change(), Duration::ZERO);
        dispatcher.fire_change_event(ChangeEvent::iface_up("eth0"), Duration::ZERO);

        assert_eq!(stream.next().await, Some(ChangeEvent::dns_change()));
        assert_eq!(stream.next().await, Some(ChangeEvent::iface_up("eth0")));
        assert!(dispatcher.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn per_event_delay_is_waited_out() {
        let (dispatcher, registry) = setup();
        let mut stream = channel(&registry);
        let _handle = dispatcher.start(&Handle::current()).unwrap();

        let started = tokio::time::Instant::now();
        dispatcher.fire_change_event(ChangeEvent::iface_up("eth0"), Duration::from_millis(500));
        dispatcher.fire_change_event(ChangeEvent::address_up("eth0", ip("10.0.0.5")), Duration::ZERO);

        assert_eq!(stream.next().await, Some(ChangeEvent::iface_up("eth0")));
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(stream.next().await.is_some());
    }

    #[test]
    fn duplicates_coalesce_while_pending() {
        let (dispatcher, registry) = setup();
        let _stream = channel(&registry);

        dispatcher.fire_change_event(ChangeEvent::iface_up("eth0"), Duration::ZERO);
        dispatcher.fire_change_event(ChangeEvent::iface_up("eth0"), Duration::ZERO);

        assert_eq!(dispatcher.pending(), 1);
    }

    #[test]
    fn event_sink_enqueues() {
        let (dispatcher, registry) = setup();
        let _stream = channel(&registry);
        let sink: &dyn EventSink = &dispatcher;

        sink.fire(ChangeEvent::dns_change(), Duration::ZERO);

        assert_eq!(dispatcher.pending(), 1);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn start_twice_spawns_once() {
        let (dispatcher, _registry) = setup();

        let first = dispatcher.start(&Handle::current());
        let second = dispatcher.start(&Handle::current());

        assert!(first.is_some());
        assert!(second.is_none());
        dispatcher.stop();
        first.unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn stop_wakes_idle_task() {
        let (dispatcher, _registry) = setup();
        let handle = dispatcher.start(&Handle::current()).unwrap();
        assert!(dispatcher.is_running());

        dispatcher.stop();

        assert!(!dispatcher.is_running());
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("dispatcher did not exit")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_pending_delay() {
        let (dispatcher, registry) = setup();
        let _stream = channel(&registry);
        let handle = dispatcher.start(&Handle::current()).unwrap();
        dispatcher.fire_change_event(ChangeEvent::iface_up("eth0"), Duration::from_secs(3_600));
        tokio::task::yield_now().await;

        let started = tokio::time::Instant::now();
        dispatcher.stop();
        handle.await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(3_600));
    }
}
