//! Interface address resolution.

use crate::error::{DdnsError, Result};
use std::net::{IpAddr, Ipv6Addr};

/// Source of the host's current global public IPv6 address.
#[cfg_attr(test, mockall::automock)]
pub trait AddressResolver: Send + Sync {
    /// Resolve the current address, or report why none is available.
    fn resolve(&self) -> Result<Ipv6Addr>;
}

/// Resolver backed by OS interface enumeration.
pub struct IfaceResolver {
    interface: String,
}

impl IfaceResolver {
    /// Create a resolver watching the named interface.
    pub fn new(interface: String) -> Self {
        Self { interface }
    }
}

impl AddressResolver for IfaceResolver {
    fn resolve(&self) -> Result<Ipv6Addr> {
        let iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == self.interface)
            .ok_or_else(|| DdnsError::InterfaceNotFound(self.interface.clone()))?;

        // A down interface is never eligible, even if the OS still lists
        // addresses for it.
        if !iface.is_up() {
            return Err(DdnsError::InterfaceDown(self.interface.clone()));
        }

        select_global_ipv6(iface.ips.iter().map(|net| net.ip()))
            .ok_or_else(|| DdnsError::NoPublicAddress(self.interface.clone()))
    }
}

/// Pick the first qualifying global public IPv6 address, in input order.
///
/// An address qualifies iff it is global-unicast, not unique-local, and not
/// an IPv4-mapped form. First match wins; no best-address ranking is
/// attempted, so the result follows whatever order the caller enumerates in.
pub fn select_global_ipv6(addrs: impl IntoIterator<Item = IpAddr>) -> Option<Ipv6Addr> {
    for addr in addrs {
        let v6 = match addr {
            IpAddr::V6(v6) => v6,
            IpAddr::V4(_) => {
                tracing::debug!("{} skipped (IPv4)", addr);
                continue;
            }
        };

        let global = is_global_unicast(&v6);
        let private = is_unique_local(&v6);
        let mapped = v6.to_ipv4_mapped().is_some();

        tracing::debug!("{} global={} private={} v4_mapped={}", v6, global, private, mapped);

        if global && !private && !mapped {
            tracing::debug!("stopping search, found {}", v6);
            return Some(v6);
        }
    }

    None
}

// fe80::/10
fn is_link_local(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}

// fc00::/7 (unique-local, RFC 4193)
fn is_unique_local(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xfe00) == 0xfc00
}

fn is_global_unicast(ip: &Ipv6Addr) -> bool {
    !(ip.is_unspecified() || ip.is_loopback() || ip.is_multicast() || is_link_local(ip))
}
