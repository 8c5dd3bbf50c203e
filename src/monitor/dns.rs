//! Resolver configuration source.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Default resolver configuration on Unix hosts.
pub const DEFAULT_RESOLV_CONF: &str = "/etc/resolv.conf";

/// Reports the configured name servers.
pub trait DnsConfigSource: Send + Sync {
    /// Returns the configured name servers in order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the configuration cannot be read.
    fn nameservers(&self) -> std::io::Result<Vec<IpAddr>>;
}

/// Reads name servers from a `resolv.conf` style file.
#[derive(Debug, Clone)]
pub struct ResolvConf {
    path: PathBuf,
}

impl ResolvConf {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ResolvConf {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLV_CONF)
    }
}

impl DnsConfigSource for ResolvConf {
    fn nameservers(&self) -> std::io::Result<Vec<IpAddr>> {
        Ok(parse_nameservers(&std::fs::read_to_string(&self.path)?))
    }
}

/// Extracts `nameserver` entries, skipping comments and unparsable values.
///
/// Scoped IPv6 entries (`fe80::1%eth0`) keep only the address part.
#[must_use]
pub fn parse_nameservers(content: &str) -> Vec<IpAddr> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            (parts.next() == Some("nameserver")).then(|| parts.next()).flatten()
        })
        .filter_map(|value| value.split('%').next()?.parse().ok())
        .collect()
}
