//! Hierarchical CIDR address-pool allocator for a community wireless mesh.
//!
//! Address space is managed as a tree of pool records: every allocated block
//! is a record with a proper parent reference back to an administratively
//! created root pool. Three operations mutate the tree — buddy allocation
//! (`allocate`), exact subnet reservation (`reserve`) and coalescing reclaim
//! (`free`) — each executing as one atomic unit under its root's exclusive
//! lock. `overlaps` probes allocated space across all roots.

pub mod constants;
pub mod errors;
pub mod helpers;
pub mod root_lock;
pub mod store;
pub mod types;

pub use errors::Error;
pub use types::{
    AddressFamily, Pool, PoolHandle, PoolId, PoolStatus, PoolUsage, RootConfig,
};

use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use log::{debug, error, info};
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;

use constants::{DEFAULT_LOCK_TIMEOUT, DEFAULT_V4_MAX_PREFIX_LEN, DEFAULT_V4_MIN_PREFIX_LEN};
use helpers::{
    addr_to_key, canonical, contains, effective_plen, half_host_units, intersects, net_parts,
    upper_half,
};
use root_lock::RootLockManager;
use store::PoolStore;

/// Build an `InvariantViolation` and log it loudly; corrupted tree state
/// must never be silently swallowed.
fn invariant(msg: String) -> Error {
    let err = Error::InvariantViolation(msg);
    error!("[INVARIANT] {err}");
    err
}

/// The allocator: pool record store plus per-root transaction boundary.
pub struct PoolRegistry {
    store: PoolStore,
    locks: RootLockManager,
    /// Serialises root creation so two overlapping roots cannot be admitted
    /// concurrently; tree operations never take this.
    admin: Mutex<()>,
}

impl PoolRegistry {
    // ---- logging bootstraper -------------------------------------------------
    fn ensure_logging() {
        static INIT: OnceCell<()> = OnceCell::new();
        INIT.get_or_init(|| {
            let _ = env_logger::builder()
                .format_timestamp(None)
                .is_test(std::env::var("RUST_TEST_THREADS").is_ok())
                .try_init();
        });
    }

    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(timeout: Duration) -> Self {
        Self::ensure_logging();
        PoolRegistry {
            store: PoolStore::new(),
            locks: RootLockManager::new(timeout),
            admin: Mutex::new(()),
        }
    }

    // ------------------------------------------------------------------- //
    // Root administration
    // ------------------------------------------------------------------- //

    /// Create a new top-level pool with its allocation policy. The range
    /// must not intersect any existing root of the same family.
    pub fn create_root(&self, cfg: RootConfig) -> Result<PoolId, Error> {
        let (family, key, plen) = net_parts(&cfg.network);
        if plen >= family.host_ceiling() {
            return Err(Error::InvalidPrefixLength(plen));
        }

        // IPv4 roots inherit the registry's historical policy defaults when
        // none are configured; IPv6 roots stay unbounded.
        let (minimum, maximum) = match family {
            AddressFamily::Ipv4 => (
                cfg.prefix_len_minimum.or(Some(DEFAULT_V4_MIN_PREFIX_LEN)),
                cfg.prefix_len_maximum.or(Some(DEFAULT_V4_MAX_PREFIX_LEN)),
            ),
            AddressFamily::Ipv6 => (cfg.prefix_len_minimum, cfg.prefix_len_maximum),
        };
        for bound in [minimum, cfg.prefix_len_default, maximum].into_iter().flatten() {
            if bound > family.host_ceiling() {
                return Err(Error::InvalidPrefixLength(bound));
            }
        }
        if let (Some(min), Some(max)) = (minimum, maximum) {
            if min > max {
                return Err(Error::InvalidPrefixLength(min));
            }
        }
        if let Some(default) = cfg.prefix_len_default {
            if minimum.is_some_and(|min| default < min) || maximum.is_some_and(|max| default > max)
            {
                return Err(Error::InvalidPrefixLength(default));
            }
        }

        let _admin = self
            .admin
            .lock()
            .map_err(|_| invariant("root admin lock poisoned".into()))?;

        let eff = effective_plen(family, plen);
        for other_id in self.store.roots() {
            let other = match self.store.get(other_id) {
                Some(p) => p,
                None => continue,
            };
            if other.family == family
                && intersects(other.network, other.effective_plen(), key, eff)
            {
                return Err(Error::Conflict);
            }
        }

        let id = self.store.next_id();
        self.store.insert(Pool {
            id,
            parent: None,
            root: id,
            family,
            network: key,
            prefix_len: plen,
            status: PoolStatus::Free,
            description: cfg.description,
            prefix_len_default: cfg.prefix_len_default,
            prefix_len_minimum: minimum,
            prefix_len_maximum: maximum,
            children: None,
            owner_ref: None,
            allocated_at: None,
        });
        gauge!("meshpool_root_pools").set(self.store.roots().len() as f64);
        info!("[CREATE] root pool {}/{plen} ({}) id={id}", cfg.network.addr(), family.as_str());
        Ok(id)
    }

    /// Snapshot of a single record, for the registry/form layer.
    pub fn get(&self, id: PoolId) -> Option<Pool> {
        self.store.get(id)
    }

    /// All root pool ids, ascending.
    pub fn roots(&self) -> Vec<PoolId> {
        self.store.roots()
    }

    // ------------------------------------------------------------------- //
    // Buddy allocation
    // ------------------------------------------------------------------- //

    /// Allocate any free block of `prefix_len` (default: the root's
    /// configured default length) from the given root pool, lowest address
    /// first. The returned handle identifies the now-`Full` leaf.
    pub fn allocate(
        &self,
        root_id: PoolId,
        prefix_len: Option<u8>,
        owner: Option<&str>,
    ) -> Result<PoolHandle, Error> {
        counter!("meshpool_allocations_total").increment(1);
        let _guard = self.locks.acquire(root_id)?;
        let root = self.store.get(root_id).ok_or(Error::NotFound)?;
        if !root.is_root() {
            return Err(Error::NotFound);
        }
        let plen = match prefix_len.or(root.prefix_len_default) {
            Some(p) => p,
            None => {
                debug!("[ALLOCATE] root={root_id}: no prefix length requested or configured");
                return Err(Error::InvalidPrefixLength(0));
            }
        };
        Self::check_policy_bounds(&root, plen)?;
        info!("[ALLOCATE] root={root_id} ({root}), prefix_len={plen}");

        let leaf = self.allocate_buddy(root_id, plen)?;
        self.attach_allocation(leaf, owner)?;
        let pool = self.fetch(leaf)?;
        debug!("[ALLOCATE] handed out {pool} (id={leaf})");
        Ok(Self::handle_for(&pool))
    }

    /// Recursive buddy search: deterministic and left-biased. Ascending
    /// traversal of existing children; a free leaf too large for the request
    /// is split and only its lower half descended, leaving the upper buddy
    /// free for subsequent requests.
    fn allocate_buddy(&self, id: PoolId, plen: u8) -> Result<PoolId, Error> {
        let pool = self.fetch(id)?;
        if pool.prefix_len > plen {
            // Gone too deep, the request does not fit this subtree
            return Err(Error::CapacityExhausted);
        }
        if pool.prefix_len == plen {
            if pool.is_leaf() && pool.status == PoolStatus::Free {
                self.store.with_mut(id, |p| p.status = PoolStatus::Full)?;
                return Ok(id);
            }
            return Err(Error::CapacityExhausted);
        }

        match pool.children {
            Some((lower, upper)) => {
                for child in [lower, upper] {
                    if self.fetch(child)?.status == PoolStatus::Full {
                        continue;
                    }
                    match self.allocate_buddy(child, plen) {
                        Ok(leaf) => {
                            self.mark_full_if_children_full(id)?;
                            return Ok(leaf);
                        }
                        Err(Error::CapacityExhausted) => continue,
                        Err(e) => return Err(e),
                    }
                }
                Err(Error::CapacityExhausted)
            }
            None => {
                if pool.status != PoolStatus::Free {
                    return Err(Error::CapacityExhausted);
                }
                let (lower, _upper) = self.split_buddy(id)?;
                // A freshly split lower half is wholly free, so descending it
                // must reach the requested depth; anything else is corruption.
                match self.allocate_buddy(lower, plen) {
                    Ok(leaf) => Ok(leaf),
                    Err(e) => Err(invariant(format!(
                        "freshly split lower half of pool {id} could not satisfy /{plen}: {e}"
                    ))),
                }
            }
        }
    }

    // ------------------------------------------------------------------- //
    // Exact reservation
    // ------------------------------------------------------------------- //

    /// Reserve the specific range `network/prefix_len` inside the given root
    /// pool, creating whatever intermediate splits are needed. With
    /// `check_only` the full search runs but nothing is committed and
    /// `Ok(None)` is returned on success.
    pub fn reserve(
        &self,
        root_id: PoolId,
        network: IpAddr,
        prefix_len: u8,
        check_only: bool,
        owner: Option<&str>,
    ) -> Result<Option<PoolHandle>, Error> {
        counter!("meshpool_reservations_total").increment(1);
        let _guard = self.locks.acquire(root_id)?;
        let root = self.store.get(root_id).ok_or(Error::NotFound)?;
        if !root.is_root() {
            return Err(Error::NotFound);
        }
        Self::check_policy_bounds(&root, prefix_len)?;
        if AddressFamily::of(&network) != root.family {
            return Err(Error::Conflict);
        }
        let eff = effective_plen(root.family, prefix_len);
        let key = canonical(addr_to_key(&network), eff);
        if !contains(root.network, root.effective_plen(), key, eff) {
            counter!("meshpool_conflicts_total").increment(1);
            return Err(Error::Conflict);
        }
        info!("[RESERVE] root={root_id}, target={network}/{prefix_len}, check_only={check_only}");

        match self.reserve_in(root_id, key, prefix_len, check_only) {
            Ok(Some(leaf)) => {
                self.attach_allocation(leaf, owner)?;
                let pool = self.fetch(leaf)?;
                debug!("[RESERVE] reserved {pool} (id={leaf})");
                Ok(Some(Self::handle_for(&pool)))
            }
            Ok(None) => {
                debug!("[RESERVE] dry run ok for {network}/{prefix_len}");
                Ok(None)
            }
            Err(e) => {
                if e == Error::Conflict {
                    counter!("meshpool_conflicts_total").increment(1);
                }
                Err(e)
            }
        }
    }

    /// Recursive reservation: descent is directed by containment rather than
    /// ascending order, and any split performed at a level is rolled back at
    /// that level when the level below fails to commit.
    fn reserve_in(
        &self,
        id: PoolId,
        key: u128,
        plen: u8,
        check_only: bool,
    ) -> Result<Option<PoolId>, Error> {
        let pool = self.fetch(id)?;
        if pool.network == key && pool.prefix_len == plen {
            // We are the target range
            if pool.is_leaf() && pool.status == PoolStatus::Free {
                if check_only {
                    return Ok(None);
                }
                self.store.with_mut(id, |p| p.status = PoolStatus::Full)?;
                return Ok(Some(id));
            }
            return Err(Error::Conflict);
        }

        let eff = effective_plen(pool.family, plen);
        if !contains(pool.network, pool.effective_plen(), key, eff) {
            return Err(Error::Conflict);
        }

        match pool.children {
            Some((lower, upper)) => {
                let child = self.containing_child(lower, upper, key, eff)?;
                let res = self.reserve_in(child, key, plen, check_only)?;
                if res.is_some() {
                    self.mark_full_if_children_full(id)?;
                }
                Ok(res)
            }
            None => {
                if pool.status != PoolStatus::Free {
                    return Err(Error::Conflict);
                }
                let (lower, upper) = self.split_buddy(id)?;
                let child = self.containing_child(lower, upper, key, eff)?;
                match self.reserve_in(child, key, plen, check_only) {
                    Ok(Some(leaf)) => {
                        self.mark_full_if_children_full(id)?;
                        Ok(Some(leaf))
                    }
                    // Speculative split must not survive a miss or a dry run
                    other => {
                        self.rollback_split(id, lower, upper)?;
                        other
                    }
                }
            }
        }
    }

    fn containing_child(
        &self,
        lower: PoolId,
        upper: PoolId,
        key: u128,
        eff: u8,
    ) -> Result<PoolId, Error> {
        let lo = self.fetch(lower)?;
        if contains(lo.network, lo.effective_plen(), key, eff) {
            Ok(lower)
        } else {
            Ok(upper)
        }
    }

    // ------------------------------------------------------------------- //
    // Free and reclaim
    // ------------------------------------------------------------------- //

    /// Return an allocated leaf to its pool: the allocation record is
    /// cleared and free sibling pairs are coalesced back into their parents
    /// up to the root. Stale handles fail with `NotFound`.
    pub fn free(&self, handle: &PoolHandle) -> Result<(), Error> {
        counter!("meshpool_frees_total").increment(1);
        let _guard = self.locks.acquire(handle.root)?;
        let pool = self.store.get(handle.id).ok_or(Error::NotFound)?;
        let matches_handle = pool.root == handle.root
            && pool.family == AddressFamily::of(&handle.network)
            && pool.network == addr_to_key(&handle.network)
            && pool.prefix_len == handle.prefix_len;
        if !matches_handle || !pool.is_leaf() || pool.status != PoolStatus::Full {
            return Err(Error::NotFound);
        }
        info!("[FREE] {handle} (id={})", handle.id);
        self.store.with_mut(handle.id, |p| {
            p.status = PoolStatus::Free;
            p.owner_ref = None;
            p.allocated_at = None;
        })?;
        self.reclaim(handle.id)
    }

    /// Walk from a just-freed leaf upward, deleting free sibling pairs and
    /// restoring ancestor statuses, until the root or a level where nothing
    /// changes.
    fn reclaim(&self, start: PoolId) -> Result<(), Error> {
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let pool = self.fetch(id)?;
            let up = pool.parent;
            match pool.children {
                None => cursor = up,
                Some((lower, upper)) => {
                    let lo = self.fetch(lower)?.status;
                    let hi = self.fetch(upper)?.status;
                    let free_children =
                        usize::from(lo == PoolStatus::Free) + usize::from(hi == PoolStatus::Free);
                    if free_children == 2 {
                        // Both halves free: the children are no longer needed
                        self.store.remove(lower);
                        self.store.remove(upper);
                        self.store.with_mut(id, |p| {
                            p.children = None;
                            p.status = PoolStatus::Free;
                        })?;
                        counter!("meshpool_reclaimed_pools_total").increment(2);
                        debug!("[RECLAIM] coalesced pool {id}");
                        cursor = up;
                    } else if free_children == 1
                        || lo == PoolStatus::Partial
                        || hi == PoolStatus::Partial
                    {
                        self.store.with_mut(id, |p| p.status = PoolStatus::Partial)?;
                        cursor = up;
                    } else {
                        // Both children full, nothing changed at this level
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------- //
    // Conflict probe
    // ------------------------------------------------------------------- //

    /// True if the candidate range intersects space that is currently
    /// allocated under any managed root. Free managed space does not count:
    /// a probe against an untouched root is not a conflict.
    pub fn overlaps(&self, network: IpAddr, prefix_len: u8) -> Result<bool, Error> {
        let family = AddressFamily::of(&network);
        if prefix_len > family.width() {
            return Err(Error::InvalidPrefixLength(prefix_len));
        }
        let eff = effective_plen(family, prefix_len);
        let key = canonical(addr_to_key(&network), eff);
        for root_id in self.store.roots() {
            let root = match self.store.get(root_id) {
                Some(p) => p,
                None => continue,
            };
            if root.family != family
                || !intersects(root.network, root.effective_plen(), key, eff)
            {
                continue;
            }
            let _guard = self.locks.acquire(root_id)?;
            if self.subtree_has_allocation(root_id, key, eff)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn subtree_has_allocation(&self, id: PoolId, key: u128, eff: u8) -> Result<bool, Error> {
        let pool = self.fetch(id)?;
        if !intersects(pool.network, pool.effective_plen(), key, eff) {
            return Ok(false);
        }
        match pool.status {
            PoolStatus::Full => Ok(true),
            PoolStatus::Free => Ok(false),
            PoolStatus::Partial => {
                let (lower, upper) = pool
                    .children
                    .ok_or_else(|| invariant(format!("partial pool {id} has no children")))?;
                Ok(self.subtree_has_allocation(lower, key, eff)?
                    || self.subtree_has_allocation(upper, key, eff)?)
            }
        }
    }

    // ------------------------------------------------------------------- //
    // Statistics and verification
    // ------------------------------------------------------------------- //

    /// Capacity report for one root, in half-host units.
    pub fn usage(&self, root_id: PoolId) -> Result<PoolUsage, Error> {
        let _guard = self.locks.acquire(root_id)?;
        let root = self.store.get(root_id).ok_or(Error::NotFound)?;
        if !root.is_root() {
            return Err(Error::NotFound);
        }
        let mut allocated = 0u128;
        let mut free = 0u128;
        self.accumulate_usage(root_id, &mut allocated, &mut free)?;
        Ok(PoolUsage {
            total: half_host_units(root.effective_plen()),
            allocated,
            free,
        })
    }

    fn accumulate_usage(
        &self,
        id: PoolId,
        allocated: &mut u128,
        free: &mut u128,
    ) -> Result<(), Error> {
        let pool = self.fetch(id)?;
        match pool.children {
            Some((lower, upper)) => {
                self.accumulate_usage(lower, allocated, free)?;
                self.accumulate_usage(upper, allocated, free)
            }
            None => {
                let units = half_host_units(pool.effective_plen());
                match pool.status {
                    PoolStatus::Full => *allocated += units,
                    PoolStatus::Free => *free += units,
                    PoolStatus::Partial => {
                        return Err(invariant(format!("leaf pool {id} is partial")))
                    }
                }
                Ok(())
            }
        }
    }

    /// Full audit of one root's tree against the structural invariants:
    /// 0-or-2 children, exact partition into halves, status coherence and
    /// conservation of address space. Intended for tests and admin tooling.
    pub fn verify(&self, root_id: PoolId) -> Result<(), Error> {
        let _guard = self.locks.acquire(root_id)?;
        let root = self.store.get(root_id).ok_or(Error::NotFound)?;
        if !root.is_root() {
            return Err(Error::NotFound);
        }
        self.verify_subtree(root_id, &root)?;
        Ok(())
    }

    fn verify_subtree(&self, id: PoolId, root: &Pool) -> Result<PoolStatus, Error> {
        let pool = self.fetch(id)?;
        if pool.family != root.family || pool.root != root.id {
            return Err(invariant(format!("pool {id} does not belong to root {}", root.id)));
        }
        if pool.prefix_len > root.family.host_ceiling() {
            return Err(invariant(format!(
                "pool {id} prefix /{} exceeds the host ceiling",
                pool.prefix_len
            )));
        }
        match pool.children {
            None => {
                if pool.status == PoolStatus::Partial {
                    return Err(invariant(format!("leaf pool {id} is partial")));
                }
                if pool.status != PoolStatus::Full
                    && (pool.owner_ref.is_some() || pool.allocated_at.is_some())
                {
                    return Err(invariant(format!("free leaf {id} carries an allocation record")));
                }
                Ok(pool.status)
            }
            Some((lower, upper)) => {
                let lo = self.fetch(lower)?;
                let hi = self.fetch(upper)?;
                let eff = pool.effective_plen();
                if lo.prefix_len != pool.prefix_len + 1 || hi.prefix_len != pool.prefix_len + 1 {
                    return Err(invariant(format!("children of pool {id} are not one level deeper")));
                }
                if lo.network != pool.network || hi.network != upper_half(pool.network, eff) {
                    return Err(invariant(format!(
                        "children of pool {id} do not partition its range"
                    )));
                }
                if lo.parent != Some(id) || hi.parent != Some(id) {
                    return Err(invariant(format!("children of pool {id} disown their parent")));
                }
                if pool.owner_ref.is_some() || pool.allocated_at.is_some() {
                    return Err(invariant(format!(
                        "interior pool {id} carries an allocation record"
                    )));
                }
                let ls = self.verify_subtree(lower, root)?;
                let hs = self.verify_subtree(upper, root)?;
                if ls == PoolStatus::Free && hs == PoolStatus::Free {
                    return Err(invariant(format!("pool {id} holds two free children")));
                }
                let expected = if ls == PoolStatus::Full && hs == PoolStatus::Full {
                    PoolStatus::Full
                } else {
                    PoolStatus::Partial
                };
                if pool.status != expected {
                    return Err(invariant(format!(
                        "pool {id} status {:?} does not match its children",
                        pool.status
                    )));
                }
                Ok(pool.status)
            }
        }
    }

    // ------------------------------------------------------------------- //
    // Internal plumbing
    // ------------------------------------------------------------------- //

    /// Record lookup during a traversal; a dangling reference means the tree
    /// is corrupt, not that the caller passed a bad id.
    fn fetch(&self, id: PoolId) -> Result<Pool, Error> {
        self.store
            .get(id)
            .ok_or_else(|| invariant(format!("dangling pool reference {id}")))
    }

    /// Split a free leaf into its two buddy halves and mark it partial.
    fn split_buddy(&self, id: PoolId) -> Result<(PoolId, PoolId), Error> {
        let pool = self.fetch(id)?;
        let eff = pool.effective_plen();
        if eff >= 127 {
            return Err(invariant(format!(
                "pool {id} at /{} cannot be split below a single host",
                pool.prefix_len
            )));
        }
        let lower_id = self.store.next_id();
        let upper_id = self.store.next_id();
        let child = |cid: PoolId, network: u128| Pool {
            id: cid,
            parent: Some(id),
            root: pool.root,
            family: pool.family,
            network,
            prefix_len: pool.prefix_len + 1,
            status: PoolStatus::Free,
            description: None,
            prefix_len_default: None,
            prefix_len_minimum: None,
            prefix_len_maximum: None,
            children: None,
            owner_ref: None,
            allocated_at: None,
        };
        self.store.insert(child(lower_id, pool.network));
        self.store.insert(child(upper_id, upper_half(pool.network, eff)));
        self.store.with_mut(id, |p| {
            p.children = Some((lower_id, upper_id));
            p.status = PoolStatus::Partial;
        })?;
        Ok((lower_id, upper_id))
    }

    /// Undo a speculative split: both children must have come back out of
    /// the recursion as free leaves.
    fn rollback_split(&self, id: PoolId, lower: PoolId, upper: PoolId) -> Result<(), Error> {
        for child in [lower, upper] {
            let pool = self.fetch(child)?;
            if !pool.is_leaf() || pool.status != PoolStatus::Free {
                return Err(invariant(format!(
                    "speculative child {child} of pool {id} is not a free leaf at rollback"
                )));
            }
        }
        self.store.remove(lower);
        self.store.remove(upper);
        self.store.with_mut(id, |p| {
            p.children = None;
            p.status = PoolStatus::Free;
        })
    }

    fn mark_full_if_children_full(&self, id: PoolId) -> Result<(), Error> {
        let pool = self.fetch(id)?;
        if let Some((lower, upper)) = pool.children {
            if self.fetch(lower)?.status == PoolStatus::Full
                && self.fetch(upper)?.status == PoolStatus::Full
            {
                self.store.with_mut(id, |p| p.status = PoolStatus::Full)?;
            }
        }
        Ok(())
    }

    fn check_policy_bounds(root: &Pool, plen: u8) -> Result<(), Error> {
        if plen >= root.family.host_ceiling() {
            return Err(Error::InvalidPrefixLength(plen));
        }
        if root.prefix_len_minimum.is_some_and(|min| plen < min)
            || root.prefix_len_maximum.is_some_and(|max| plen > max)
        {
            return Err(Error::InvalidPrefixLength(plen));
        }
        Ok(())
    }

    fn attach_allocation(&self, leaf: PoolId, owner: Option<&str>) -> Result<(), Error> {
        self.store.with_mut(leaf, |p| {
            p.owner_ref = owner.map(str::to_owned);
            p.allocated_at = Some(SystemTime::now());
        })
    }

    fn handle_for(pool: &Pool) -> PoolHandle {
        PoolHandle {
            id: pool.id,
            root: pool.root,
            network: pool.addr(),
            prefix_len: pool.prefix_len,
        }
    }

    /// Remove an entirely free root pool from management.
    pub fn remove_root(&self, root_id: PoolId) -> Result<(), Error> {
        let guard = self.locks.acquire(root_id)?;
        let root = self.store.get(root_id).ok_or(Error::NotFound)?;
        if !root.is_root() {
            return Err(Error::NotFound);
        }
        if !root.is_leaf() || root.status != PoolStatus::Free {
            return Err(Error::Conflict);
        }
        self.store.remove(root_id);
        drop(guard);
        self.locks.forget(root_id);
        gauge!("meshpool_root_pools").set(self.store.roots().len() as f64);
        info!("[REMOVE] root pool id={root_id}");
        Ok(())
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
