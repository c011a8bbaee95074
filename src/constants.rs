//! Constants and policy defaults for pool allocation

use std::time::Duration;

/// Shift applied to IPv4 prefix lengths when mapping into the unified
/// 128-bit key space (IPv4-mapped addresses occupy the low 32 bits).
pub const V4_PLEN_SHIFT: u8 = 96;

/// Hard ceiling for IPv4 pool prefixes: a /31 cannot be split further.
pub const V4_HOST_CEILING: u8 = 31;
/// Hard ceiling for IPv6 pool prefixes.
pub const V6_HOST_CEILING: u8 = 127;

// Policy bounds applied to IPv4 root pools that do not configure their own,
// matching the data-model defaults of the mesh registry.
pub const DEFAULT_V4_MIN_PREFIX_LEN: u8 = 24;
pub const DEFAULT_V4_MAX_PREFIX_LEN: u8 = 28;

/// Bound on waiting for a root's exclusive lock before giving up with
/// `Error::LockTimeout`.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
