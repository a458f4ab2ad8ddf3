//! Concurrency Manager Module
//!
//! One non-blocking mutex per registered pool. A held lock means a swap on that
//! pool is in flight; a second intent for the same pool is dropped, never queued.

use crate::{dex::PoolId, error::ArbError};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct ExecutionLocks {
    locks: DashMap<PoolId, Arc<Mutex<()>>>,
}

impl ExecutionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, pool_id: PoolId) {
        self.locks
            .entry(pool_id)
            .or_insert_with(|| Arc::new(Mutex::new(())));
    }

    /// Takes the pool's lock without waiting. The guard is owned so it can travel
    /// into the spawned execution task and release when that task finishes.
    pub fn try_acquire(&self, pool_id: PoolId) -> Result<OwnedMutexGuard<()>, ArbError> {
        let lock = self
            .locks
            .get(&pool_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ArbError::PoolNotFound(pool_id.to_string()))?;
        lock.try_lock_owned().map_err(|_| {
            ArbError::LockContention(format!("pool {} has a trade in flight", pool_id))
        })
    }

    pub fn is_busy(&self, pool_id: PoolId) -> bool {
        self.locks
            .get(&pool_id)
            .map(|entry| entry.value().try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of pools with a trade in flight right now.
    pub fn busy_count(&self) -> usize {
        self.locks
            .iter()
            .filter(|entry| entry.value().try_lock().is_err())
            .count()
    }
}
