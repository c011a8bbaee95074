//! Pool node store: an arena of pool records indexed by identity.
//!
//! Parent/child relationships are stored as `PoolId` references rather than
//! live ownership pointers; all tree mutations against one root happen under
//! that root's exclusive lock, so record-level access needs no further
//! coordination than the sharded map provides.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::errors::Error;
use crate::types::{Pool, PoolId};

pub struct PoolStore {
    pools: DashMap<PoolId, Pool>,
    roots: DashMap<PoolId, ()>,
    next_id: AtomicU64,
}

impl PoolStore {
    pub fn new() -> Self {
        PoolStore {
            pools: DashMap::new(),
            roots: DashMap::new(),
            // Start from 1, reserve 0 for null/invalid
            next_id: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> PoolId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn insert(&self, pool: Pool) {
        if pool.is_root() {
            self.roots.insert(pool.id, ());
        }
        self.pools.insert(pool.id, pool);
    }

    /// Snapshot of a record. Records are small; callers work on clones so no
    /// shard guard is held across tree recursion.
    pub fn get(&self, id: PoolId) -> Option<Pool> {
        self.pools.get(&id).map(|entry| entry.clone())
    }

    /// Apply `f` to the record in place. The closure must not touch the
    /// store again, or it could deadlock on the same shard.
    pub fn with_mut<T>(&self, id: PoolId, f: impl FnOnce(&mut Pool) -> T) -> Result<T, Error> {
        match self.pools.get_mut(&id) {
            Some(mut entry) => Ok(f(&mut entry)),
            None => Err(Error::NotFound),
        }
    }

    pub fn remove(&self, id: PoolId) -> Option<Pool> {
        self.roots.remove(&id);
        self.pools.remove(&id).map(|(_, pool)| pool)
    }

    pub fn roots(&self) -> Vec<PoolId> {
        let mut ids: Vec<PoolId> = self.roots.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl Default for PoolStore {
    fn default() -> Self {
        Self::new()
    }
}
