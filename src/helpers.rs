//! Key math for the unified 128-bit address space.
//!
//! IPv4 networks are mapped into the low 32 bits of a `u128` with their
//! prefix length shifted by 96, so a single set of mask/containment helpers
//! serves both families.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;

use crate::constants::V4_PLEN_SHIFT;
use crate::types::AddressFamily;

#[inline]
pub fn v4_key(addr: Ipv4Addr) -> u128 {
    u32::from(addr) as u128
}

#[inline]
pub fn v6_key(addr: Ipv6Addr) -> u128 {
    u128::from(addr)
}

#[inline]
pub fn addr_to_key(addr: &IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => v4_key(*v4),
        IpAddr::V6(v6) => v6_key(*v6),
    }
}

#[inline]
pub fn key_to_addr(family: AddressFamily, key: u128) -> IpAddr {
    match family {
        AddressFamily::Ipv4 => IpAddr::V4(Ipv4Addr::from(key as u32)),
        AddressFamily::Ipv6 => IpAddr::V6(Ipv6Addr::from(key)),
    }
}

/// Family-native prefix length mapped into the 128-bit key space.
#[inline]
pub fn effective_plen(family: AddressFamily, prefix_len: u8) -> u8 {
    match family {
        AddressFamily::Ipv4 => prefix_len.saturating_add(V4_PLEN_SHIFT),
        AddressFamily::Ipv6 => prefix_len,
    }
}

#[inline]
pub fn mask(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else if prefix_len >= 128 {
        !0u128
    } else {
        !(!0u128 >> prefix_len)
    }
}

// Canonicalise a key: zero host bits beyond `plen`.
#[inline]
pub fn canonical(key: u128, plen: u8) -> u128 {
    key & mask(plen)
}

/// True if `inner/inner_plen` lies entirely within `outer/outer_plen`.
/// Prefix lengths are effective (128-bit space) values.
#[inline]
pub fn contains(outer: u128, outer_plen: u8, inner: u128, inner_plen: u8) -> bool {
    inner_plen >= outer_plen && canonical(inner, outer_plen) == canonical(outer, outer_plen)
}

/// True if the two ranges share any address: with power-of-two CIDR blocks
/// this is exactly containment in one direction or the other.
#[inline]
pub fn intersects(a: u128, a_plen: u8, b: u128, b_plen: u8) -> bool {
    contains(a, a_plen, b, b_plen) || contains(b, b_plen, a, a_plen)
}

/// Key of the upper buddy half when splitting a block of effective prefix
/// length `plen`. Callers must have checked `plen` against the host
/// ceiling, so the child bit position is always valid.
#[inline]
pub fn upper_half(key: u128, plen: u8) -> u128 {
    debug_assert!(plen <= 127);
    key | (1u128 << (127 - plen))
}

/// Size of a block in half-host units: the deepest splittable block
/// (effective /127) counts as one unit, so sums never overflow `u128`.
#[inline]
pub fn half_host_units(plen: u8) -> u128 {
    debug_assert!(plen <= 127);
    1u128 << (127 - plen)
}

/// Decompose an `IpNet` into (family, canonical key, native prefix length).
pub fn net_parts(net: &IpNet) -> (AddressFamily, u128, u8) {
    let family = match net {
        IpNet::V4(_) => AddressFamily::Ipv4,
        IpNet::V6(_) => AddressFamily::Ipv6,
    };
    let plen = net.prefix_len();
    let key = canonical(addr_to_key(&net.addr()), effective_plen(family, plen));
    (family, key, plen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v4_mapping_round_trips() {
        let addr: Ipv4Addr = "10.0.5.0".parse().unwrap();
        let key = v4_key(addr);
        assert_eq!(key_to_addr(AddressFamily::Ipv4, key), IpAddr::V4(addr));
        assert_eq!(effective_plen(AddressFamily::Ipv4, 24), 120);
    }

    #[test]
    fn canonical_zeroes_host_bits() {
        let key = v4_key("192.168.1.77".parse().unwrap());
        let plen = effective_plen(AddressFamily::Ipv4, 26);
        assert_eq!(
            key_to_addr(AddressFamily::Ipv4, canonical(key, plen)),
            "192.168.1.64".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn containment_both_directions() {
        let outer = v4_key("10.0.0.0".parse().unwrap());
        let inner = v4_key("10.0.5.0".parse().unwrap());
        let p16 = effective_plen(AddressFamily::Ipv4, 16);
        let p24 = effective_plen(AddressFamily::Ipv4, 24);
        assert!(contains(outer, p16, inner, p24));
        assert!(!contains(inner, p24, outer, p16));
        assert!(intersects(inner, p24, outer, p16));
        let other = v4_key("10.1.0.0".parse().unwrap());
        assert!(!intersects(other, p24, inner, p24));
    }

    #[test]
    fn upper_half_is_the_buddy() {
        let key = v4_key("192.168.1.0".parse().unwrap());
        let plen = effective_plen(AddressFamily::Ipv4, 26);
        assert_eq!(
            key_to_addr(AddressFamily::Ipv4, upper_half(key, plen)),
            "192.168.1.32".parse::<IpAddr>().unwrap()
        );
    }
}
