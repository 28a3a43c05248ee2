//! CIDR helpers: map an interface address to the network it sits on.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::types::SubnetId;

/// Split `addr/prefix` into its address and prefix length.
///
/// Returns `None` for a missing prefix, a bad address, or a prefix longer
/// than the address family allows.
pub fn parse_interface(s: &str) -> Option<(IpAddr, u8)> {
  let (addr, prefix) = s.split_once('/')?;
  let addr: IpAddr = addr.parse().ok()?;
  let prefix: u8 = prefix.parse().ok()?;
  let max = match addr {
    IpAddr::V4(_) => 32,
    IpAddr::V6(_) => 128,
  };
  (prefix <= max).then_some((addr, prefix))
}

fn network_v4(addr: Ipv4Addr, prefix: u8) -> Ipv4Addr {
  let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
  Ipv4Addr::from(u32::from(addr) & mask)
}

fn network_v6(addr: Ipv6Addr, prefix: u8) -> Ipv6Addr {
  let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
  Ipv6Addr::from(u128::from(addr) & mask)
}

/// Network of an interface address, e.g. `10.10.10.3/24` -> `10.10.10.0/24`.
///
/// Total over all strings: anything that is not `addr/prefix` is its own subnet.
pub fn subnet_of(device_id: &str) -> SubnetId {
  match parse_interface(device_id) {
    Some((IpAddr::V4(a), p)) => format!("{}/{}", network_v4(a, p), p),
    Some((IpAddr::V6(a), p)) => format!("{}/{}", network_v6(a, p), p),
    None => device_id.to_string(),
  }
}
