//! Tests for interface diffing.

use super::*;
use crate::monitor::ChangeKind;
use crate::network::InterfaceKind;
use std::collections::HashSet;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn iface(name: &str, addrs: &[&str]) -> InterfaceSnapshot {
    InterfaceSnapshot::new(name, InterfaceKind::Ethernet, addrs.iter().map(|a| ip(a)))
}

fn active(snapshots: &[InterfaceSnapshot]) -> ActiveInterfaceMap {
    ActiveInterfaceMap::from_snapshots(snapshots)
}

fn all_events(diff: &InterfaceDiff) -> Vec<ChangeEvent> {
    let mut events = diff.down_events();
    events.extend(diff.up_events());
    events
}

mod sections {
    use super::*;

    #[test]
    fn identical_snapshots_produce_empty_diff() {
        let snapshot = [iface("eth0", &["10.0.0.5"])];
        let result = diff(&active(&snapshot), &snapshot);

        assert!(result.is_empty());
        assert!(all_events(&result).is_empty());
    }

    #[test]
    fn added_address_on_existing_interface_is_gained() {
        let before = [iface("wlan0", &["192.168.1.10"])];
        let after = [iface("wlan0", &["192.168.1.10", "192.168.1.11"])];

        let result = diff(&active(&before), &after);

        assert_eq!(result.gained, vec![("wlan0".to_string(), vec![ip("192.168.1.11")])]);
        assert!(result.dead.is_empty());
        assert!(result.lost.is_empty());
        assert!(result.appeared.is_empty());
    }

    #[test]
    fn removed_address_on_surviving_interface_is_lost() {
        let before = [iface("eth0", &["10.0.0.5", "10.0.0.6"])];
        let after = [iface("eth0", &["10.0.0.6"])];

        let result = diff(&active(&before), &after);

        assert_eq!(result.lost, vec![("eth0".to_string(), vec![ip("10.0.0.5")])]);
        assert!(!result.has_up());
    }

    #[test]
    fn missing_interface_is_dead_with_all_addresses() {
        let before = [iface("eth0", &["10.0.0.5"]), iface("eth1", &["10.1.0.5", "10.1.0.6"])];
        let after = [iface("eth0", &["10.0.0.5"])];

        let result = diff(&active(&before), &after);

        assert_eq!(
            result.dead,
            vec![("eth1".to_string(), vec![ip("10.1.0.5"), ip("10.1.0.6")])]
        );
    }

    #[test]
    fn new_interface_has_appeared() {
        let after = [iface("eth0", &["10.0.0.5"])];

        let result = diff(&ActiveInterfaceMap::new(), &after);

        assert_eq!(result.appeared, vec![("eth0".to_string(), vec![ip("10.0.0.5")])]);
        assert!(result.has_up());
    }
}

mod events {
    use super::*;

    #[test]
    fn wlan_gaining_second_address_emits_exactly_one_address_up() {
        let before = [iface("wlan0", &["192.168.1.10"])];
        let after = [iface("wlan0", &["192.168.1.10", "192.168.1.11"])];

        let result = diff(&active(&before), &after);

        assert_eq!(
            all_events(&result),
            vec![ChangeEvent::address_up("wlan0", ip("192.168.1.11"))]
        );
    }

    #[test]
    fn dead_interface_emits_iface_down_before_address_downs() {
        let before = [iface("eth1", &["10.1.0.5", "10.1.0.6"])];

        let result = diff(&active(&before), &[]);

        assert_eq!(
            result.down_events(),
            vec![
                ChangeEvent::iface_down("eth1"),
                ChangeEvent::address_down("eth1", ip("10.1.0.5")),
                ChangeEvent::address_down("eth1", ip("10.1.0.6")),
            ]
        );
    }

    #[test]
    fn new_interface_emits_address_ups_before_iface_up() {
        let after = [iface("eth0", &["10.0.0.5", "2001:db8::5"])];

        let result = diff(&ActiveInterfaceMap::new(), &after);

        assert_eq!(
            result.up_events(),
            vec![
                ChangeEvent::address_up("eth0", ip("10.0.0.5")),
                ChangeEvent::address_up("eth0", ip("2001:db8::5")),
                ChangeEvent::iface_up("eth0"),
            ]
        );
    }

    #[test]
    fn event_set_matches_set_differences() {
        let before = [
            iface("eth0", &["10.0.0.5", "10.0.0.6"]),
            iface("eth1", &["10.1.0.5"]),
            iface("eth2", &["10.2.0.5"]),
        ];
        let after = [
            iface("eth0", &["10.0.0.6", "10.0.0.7"]),
            iface("eth2", &["10.2.0.5"]),
            iface("wlan0", &["192.168.1.10"]),
        ];

        let events = all_events(&diff(&active(&before), &after));
        let unique: HashSet<&ChangeEvent> = events.iter().collect();

        let expected: HashSet<ChangeEvent> = [
            ChangeEvent::address_down("eth0", ip("10.0.0.5")),
            ChangeEvent::address_up("eth0", ip("10.0.0.7")),
            ChangeEvent::iface_down("eth1"),
            ChangeEvent::address_down("eth1", ip("10.1.0.5")),
            ChangeEvent::address_up("wlan0", ip("192.168.1.10")),
            ChangeEvent::iface_up("wlan0"),
        ]
        .into_iter()
        .collect();

        assert_eq!(events.len(), unique.len(), "duplicate events: {events:?}");
        assert_eq!(unique.into_iter().cloned().collect::<HashSet<_>>(), expected);
        assert!(!events.iter().any(|e| e.source == "eth2"));
    }

    #[test]
    fn down_events_never_include_up_kinds() {
        let before = [iface("eth0", &["10.0.0.5"])];
        let after = [iface("wlan0", &["192.168.1.10"])];

        let result = diff(&active(&before), &after);

        assert!(result.down_events().iter().all(|e| e.kind.is_down()));
        assert!(result.up_events().iter().all(|e| e.kind.is_up()));
        assert!(result.up_events().iter().any(|e| e.kind == ChangeKind::IfaceUp));
    }
}

mod apply {
    use super::*;

    #[test]
    fn applying_diff_reaches_current_state() {
        let before = [iface("eth0", &["10.0.0.5", "10.0.0.6"]), iface("eth1", &["10.1.0.5"])];
        let after = [iface("eth0", &["10.0.0.6", "10.0.0.7"]), iface("wlan0", &["192.168.1.10"])];
        let mut map = active(&before);

        let result = diff(&map, &after);
        map.apply(&result);

        assert_eq!(map, active(&after));
        assert!(diff(&map, &after).is_empty());
    }
}
