//! Name resolution backends.

use async_trait::async_trait;
use std::net::IpAddr;

/// Turns a hostname into a list of IP addresses.
///
/// The cache treats implementations as opaque: it never inspects records or
/// TTLs, it only stores whatever list a successful lookup returns.
/// Cancellation is cooperative: the cache drops the future when a deadline
/// elapses.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolves `host` to its addresses.
    ///
    /// # Errors
    ///
    /// Returns any error reported by the underlying mechanism (unknown host,
    /// network failure, timeout).
    async fn lookup_ip(&self, host: &str) -> std::io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system's `getaddrinfo`, via
/// [`tokio::net::lookup_host`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl SystemResolver {
    /// Creates a system resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NameResolver for SystemResolver {
    async fn lookup_ip(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        // Port 0 is only there to satisfy `ToSocketAddrs`.
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(dedup_in_order(addrs.map(|sa| sa.ip())))
    }
}

/// `getaddrinfo` yields one entry per socket type, so the same IP often
/// appears several times.
fn dedup_in_order(ips: impl IntoIterator<Item = IpAddr>) -> Vec<IpAddr> {
    let mut out: Vec<IpAddr> = Vec::new();
    for ip in ips {
        if !out.contains(&ip) {
            out.push(ip);
        }
    }
    out
}
