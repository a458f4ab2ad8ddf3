// src/arbitrage/price_cache.rs
//! Last-known observation per pool. One writer per pool (its poll), many readers.

use crate::dex::{PoolId, PriceObservation};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PriceCache {
    observations: DashMap<PoolId, PriceObservation>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `observation` if it is newer than what the cache holds for its pool.
    /// Returns false (and keeps the old value) for out-of-order observations.
    pub fn update(&self, observation: PriceObservation) -> bool {
        match self.observations.entry(observation.pool_id) {
            Entry::Occupied(mut current) => {
                if observation.timestamp <= current.get().timestamp {
                    warn!(
                        "Ignoring out-of-order observation for pool {} ({} <= {})",
                        observation.pool_id,
                        observation.timestamp,
                        current.get().timestamp
                    );
                    return false;
                }
                current.insert(observation);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(observation);
                true
            }
        }
    }

    pub fn latest(&self, pool_id: &PoolId) -> Option<PriceObservation> {
        self.observations.get(pool_id).map(|entry| entry.value().clone())
    }

    /// Copy of every pool's latest observation, for one consistent evaluation pass.
    pub fn snapshot(&self) -> HashMap<PoolId, PriceObservation> {
        self.observations
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Pools whose latest observation is older than `max_age` (ordered by id).
    pub fn stale_pools(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> Vec<PoolId> {
        let mut stale: Vec<PoolId> = self
            .observations
            .iter()
            .filter(|entry| entry.value().age(now) > max_age)
            .map(|entry| *entry.key())
            .collect();
        stale.sort();
        stale
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
