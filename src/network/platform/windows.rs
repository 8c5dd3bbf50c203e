//! Windows-specific interface enumeration using `GetAdaptersAddresses`.

use crate::network::{EnumerationError, InterfaceEnumerator, InterfaceKind, InterfaceSnapshot};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use windows::Win32::Foundation::{ERROR_BUFFER_OVERFLOW, NO_ERROR, WIN32_ERROR};
use windows::Win32::NetworkManagement::IpHelper::{
    GAA_FLAG_SKIP_ANYCAST, GAA_FLAG_SKIP_DNS_SERVER, GAA_FLAG_SKIP_MULTICAST,
    GET_ADAPTERS_ADDRESSES_FLAGS, GetAdaptersAddresses, IF_TYPE_ETHERNET_CSMACD,
    IF_TYPE_IEEE80211, IF_TYPE_SOFTWARE_LOOPBACK, IP_ADAPTER_ADDRESSES_LH,
};
use windows::Win32::NetworkManagement::Ndis::IfOperStatusUp;
use windows::Win32::Networking::WinSock::{AF_INET, AF_INET6, AF_UNSPEC, SOCKADDR_IN, SOCKADDR_IN6};

/// Interface type for PPP adapters (`iptypes.h`, not exported by the `windows` crate).
const IF_TYPE_PPP: u32 = 23;

/// Interface type for tunnel adapters (`iptypes.h`, not exported by the `windows` crate).
const IF_TYPE_TUNNEL: u32 = 131;

/// Buffer size hint; the API reports the real size if this is too small.
const INITIAL_BUFFER_SIZE: u32 = 16384;

/// Windows implementation of [`InterfaceEnumerator`].
///
/// Unlike the portable enumerator, this reports the real operational state
/// (`OperStatus`) and the adapter type, so disconnected adapters that still
/// carry a stale address are seen as down.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsEnumerator;

impl WindowsEnumerator {
    /// Creates a new Windows interface enumerator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl InterfaceEnumerator for WindowsEnumerator {
    fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
        let buffer = query_adapters()?;

        let mut interfaces = Vec::new();
        // SAFETY: GetAdaptersAddresses fills the buffer with a properly aligned
        // linked list of IP_ADAPTER_ADDRESSES_LH entries.
        #[allow(clippy::cast_ptr_alignment)]
        let mut current = buffer.as_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>();

        while !current.is_null() {
            // SAFETY: the list stays valid while `buffer` is alive.
            let adapter = unsafe { &*current };
            if let Some(snapshot) = parse_adapter(adapter) {
                interfaces.push(snapshot);
            }
            current = adapter.Next;
        }

        Ok(interfaces)
    }
}

/// Calls `GetAdaptersAddresses`, growing the buffer once if needed.
fn query_adapters() -> Result<Vec<u8>, EnumerationError> {
    let flags = GAA_FLAG_SKIP_ANYCAST | GAA_FLAG_SKIP_MULTICAST | GAA_FLAG_SKIP_DNS_SERVER;
    let family = u32::from(AF_UNSPEC.0);

    let mut buffer: Vec<u8> = vec![0u8; INITIAL_BUFFER_SIZE as usize];
    let mut size = INITIAL_BUFFER_SIZE;

    let mut result = call_api(flags, family, &mut buffer, &mut size);
    if result == ERROR_BUFFER_OVERFLOW.0 {
        buffer.resize(size as usize, 0);
        result = call_api(flags, family, &mut buffer, &mut size);
    }

    if result != NO_ERROR.0 {
        return Err(windows::core::Error::from(WIN32_ERROR(result)).into());
    }

    Ok(buffer)
}

#[cfg(not(tarpaulin_include))]
fn call_api(
    flags: GET_ADAPTERS_ADDRESSES_FLAGS,
    family: u32,
    buffer: &mut [u8],
    size: &mut u32,
) -> u32 {
    // SAFETY: `buffer` is at least `size` bytes long; the API writes at most
    // that many and updates `size` with the required length.
    unsafe {
        GetAdaptersAddresses(
            family,
            flags,
            None,
            Some(buffer.as_mut_ptr().cast()),
            std::ptr::from_mut(size),
        )
    }
}

/// Converts one adapter entry. Returns `None` if the name cannot be read.
fn parse_adapter(adapter: &IP_ADAPTER_ADDRESSES_LH) -> Option<InterfaceSnapshot> {
    // SAFETY: FriendlyName is a valid, NUL-terminated wide string owned by the buffer.
    let name = unsafe { adapter.FriendlyName.to_string().ok()? };
    // SAFETY: both union views share the leading `Length`/`IfIndex` layout.
    let index = unsafe { adapter.Anonymous1.Anonymous.IfIndex };
    let is_up = adapter.OperStatus == IfOperStatusUp;

    Some(
        InterfaceSnapshot::new(name, map_if_type(adapter.IfType), collect_addresses(adapter))
            .with_index(index)
            .with_up(is_up),
    )
}

/// Maps Windows `IF_TYPE_*` constants to [`InterfaceKind`].
const fn map_if_type(if_type: u32) -> InterfaceKind {
    match if_type {
        IF_TYPE_ETHERNET_CSMACD => InterfaceKind::Ethernet,
        IF_TYPE_IEEE80211 => InterfaceKind::Wireless,
        IF_TYPE_SOFTWARE_LOOPBACK => InterfaceKind::Loopback,
        IF_TYPE_TUNNEL | IF_TYPE_PPP => InterfaceKind::Virtual,
        other => InterfaceKind::Other(other),
    }
}

/// Collects unicast addresses in the order Windows lists them.
#[allow(clippy::cast_ptr_alignment)]
fn collect_addresses(adapter: &IP_ADAPTER_ADDRESSES_LH) -> Vec<IpAddr> {
    let mut addresses = Vec::new();
    let mut unicast = adapter.FirstUnicastAddress;

    while !unicast.is_null() {
        // SAFETY: each entry is valid while the parent adapter buffer is alive.
        let entry = unsafe { &*unicast };

        // SAFETY: lpSockaddr points at a SOCKADDR_IN or SOCKADDR_IN6.
        if let Some(sockaddr) = unsafe { entry.Address.lpSockaddr.as_ref() } {
            match sockaddr.sa_family {
                f if f == AF_INET => {
                    // SAFETY: family checked above.
                    let sin = unsafe { &*(std::ptr::from_ref(sockaddr).cast::<SOCKADDR_IN>()) };
                    // SAFETY: the union holds the address bytes in network order.
                    let b = unsafe { sin.sin_addr.S_un.S_un_b };
                    addresses.push(IpAddr::V4(Ipv4Addr::new(b.s_b1, b.s_b2, b.s_b3, b.s_b4)));
                }
                f if f == AF_INET6 => {
                    // SAFETY: family checked above.
                    let sin6 = unsafe { &*(std::ptr::from_ref(sockaddr).cast::<SOCKADDR_IN6>()) };
                    // SAFETY: IPv6 address bytes are always valid to read.
                    let octets = unsafe { sin6.sin6_addr.u.Byte };
                    addresses.push(IpAddr::V6(Ipv6Addr::from(octets)));
                }
                _ => {}
            }
        }

        unicast = entry.Next;
    }

    addresses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_if_types() {
        assert_eq!(map_if_type(IF_TYPE_ETHERNET_CSMACD), InterfaceKind::Ethernet);
        assert_eq!(map_if_type(IF_TYPE_IEEE80211), InterfaceKind::Wireless);
        assert_eq!(map_if_type(IF_TYPE_SOFTWARE_LOOPBACK), InterfaceKind::Loopback);
        assert_eq!(map_if_type(IF_TYPE_TUNNEL), InterfaceKind::Virtual);
        assert_eq!(map_if_type(IF_TYPE_PPP), InterfaceKind::Virtual);
    }

    #[test]
    fn unknown_if_type_preserves_code() {
        assert_eq!(map_if_type(999), InterfaceKind::Other(999));
    }

    #[test]
    fn enumerate_finds_loopback_adapter() {
        let interfaces = WindowsEnumerator::new()
            .enumerate()
            .expect("enumerate() failed");

        assert!(
            interfaces.iter().any(|i| i.kind.is_loopback()
                || i.addresses().contains(&IpAddr::V4(Ipv4Addr::LOCALHOST))),
            "Expected a loopback adapter, got: {interfaces:?}"
        );
    }
}
