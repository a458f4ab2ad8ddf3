// src/arbitrage/registry.rs

use crate::dex::{PoolAdapter, PoolId};
use std::collections::HashMap;
use std::sync::Arc;

/// Registered pools in registration order. Ids are assigned here and never reused;
/// registering the same on-chain address twice yields two independent pools.
#[derive(Default)]
pub struct PoolRegistry {
    order: Vec<PoolId>,
    adapters: HashMap<PoolId, Arc<dyn PoolAdapter>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn PoolAdapter>) -> PoolId {
        let id = PoolId::new();
        self.order.push(id);
        self.adapters.insert(id, adapter);
        id
    }

    pub fn get(&self, id: &PoolId) -> Option<&Arc<dyn PoolAdapter>> {
        self.adapters.get(id)
    }

    pub fn contains(&self, id: &PoolId) -> bool {
        self.adapters.contains_key(id)
    }

    pub fn ids(&self) -> &[PoolId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &Arc<dyn PoolAdapter>)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.adapters.get(id).map(|adapter| (*id, adapter)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
