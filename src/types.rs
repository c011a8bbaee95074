//! Data structures for the pool tree

use std::fmt;
use std::net::IpAddr;
use std::time::SystemTime;

use ipnet::IpNet;

use crate::constants::{V4_HOST_CEILING, V6_HOST_CEILING};
use crate::helpers::{effective_plen, key_to_addr};

/// Identity of a pool record in the store.
pub type PoolId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// One less than the address width: pools at this prefix length can no
    /// longer be split into two host-holding halves.
    pub fn host_ceiling(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => V4_HOST_CEILING,
            AddressFamily::Ipv6 => V6_HOST_CEILING,
        }
    }

    /// Address width in bits.
    pub fn width(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }

    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        }
    }
}

/// Possible pool states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    Free,
    Partial,
    Full,
}

/// A node in the address-range tree. Every allocated block is a `Pool`
/// record with a proper parent reference; roots additionally carry the
/// allocation policy consulted by all of their descendants.
#[derive(Debug, Clone)]
pub struct Pool {
    pub id: PoolId,
    pub parent: Option<PoolId>,
    /// Root of this pool's tree; equals `id` for roots.
    pub root: PoolId,
    pub family: AddressFamily,
    /// Canonical 128-bit key (IPv4 mapped into the low 32 bits).
    pub network: u128,
    /// Family-native prefix length.
    pub prefix_len: u8,
    pub status: PoolStatus,
    pub description: Option<String>,
    pub prefix_len_default: Option<u8>,
    pub prefix_len_minimum: Option<u8>,
    pub prefix_len_maximum: Option<u8>,
    /// Ordered (lower half, upper half); a pool has exactly 0 or 2 children.
    pub children: Option<(PoolId, PoolId)>,
    pub owner_ref: Option<String>,
    pub allocated_at: Option<SystemTime>,
}

impl Pool {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Prefix length in the unified 128-bit key space.
    pub fn effective_plen(&self) -> u8 {
        effective_plen(self.family, self.prefix_len)
    }

    pub fn addr(&self) -> IpAddr {
        key_to_addr(self.family, self.network)
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "{} [{}/{}]", desc, self.addr(), self.prefix_len),
            None => write!(f, "{}/{}", self.addr(), self.prefix_len),
        }
    }
}

/// Handle to an allocated leaf, returned to the configuration layer and
/// passed back to `free`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolHandle {
    pub id: PoolId,
    pub root: PoolId,
    pub network: IpAddr,
    pub prefix_len: u8,
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

/// Administrative description of a new root pool.
#[derive(Debug, Clone)]
pub struct RootConfig {
    pub network: IpNet,
    pub description: Option<String>,
    pub prefix_len_default: Option<u8>,
    pub prefix_len_minimum: Option<u8>,
    pub prefix_len_maximum: Option<u8>,
}

impl RootConfig {
    pub fn new(network: IpNet) -> Self {
        RootConfig {
            network,
            description: None,
            prefix_len_default: None,
            prefix_len_minimum: None,
            prefix_len_maximum: None,
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_owned());
        self
    }

    pub fn prefix_bounds(mut self, minimum: u8, default: u8, maximum: u8) -> Self {
        self.prefix_len_minimum = Some(minimum);
        self.prefix_len_default = Some(default);
        self.prefix_len_maximum = Some(maximum);
        self
    }
}

/// Capacity report for one root, in half-host units (the size of the
/// deepest splittable block), produced by a conservation walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolUsage {
    pub total: u128,
    pub allocated: u128,
    pub free: u128,
}
