// src/arbitrage/strategy.rs
//! The strategy seam: anything that turns a consistent market snapshot into
//! an ordered list of trade intents.

use crate::arbitrage::registry::PoolRegistry;
use crate::arbitrage::types::{StrategyState, TradeIntent};
use crate::dex::{PoolAdapter, PoolId, PriceObservation, SwapDirection, SwapEstimate};
use crate::error::ArbError;
use crate::sui::CoinRegistry;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only view handed to strategies for one evaluation pass.
pub struct MarketSnapshot<'a> {
    observations: HashMap<PoolId, PriceObservation>,
    pools: &'a PoolRegistry,
    coins: &'a CoinRegistry,
    taken_at: DateTime<Utc>,
}

impl<'a> MarketSnapshot<'a> {
    pub fn new(
        observations: HashMap<PoolId, PriceObservation>,
        pools: &'a PoolRegistry,
        coins: &'a CoinRegistry,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            observations,
            pools,
            coins,
            taken_at,
        }
    }

    pub fn observation(&self, pool_id: &PoolId) -> Option<&PriceObservation> {
        self.observations.get(pool_id)
    }

    pub fn pool(&self, pool_id: &PoolId) -> Option<&Arc<dyn PoolAdapter>> {
        self.pools.get(pool_id)
    }

    pub fn pools(&self) -> &'a PoolRegistry {
        self.pools
    }

    /// Coin type a swap in `direction` on `pool_id` consumes.
    pub fn input_coin(&self, pool_id: &PoolId, direction: SwapDirection) -> Result<&str, ArbError> {
        let spec = self
            .pool(pool_id)
            .ok_or_else(|| ArbError::PoolNotFound(pool_id.to_string()))?
            .spec();
        Ok(direction.coins(&spec.coin_a, &spec.coin_b).0)
    }

    pub fn estimate_swap(
        &self,
        pool_id: &PoolId,
        direction: SwapDirection,
        input_amount: u64,
    ) -> Result<SwapEstimate, ArbError> {
        self.pool(pool_id)
            .ok_or_else(|| ArbError::PoolNotFound(pool_id.to_string()))?
            .estimate_swap(direction, input_amount)
    }

    /// Configured trade size for a coin type, if the coin table has one.
    pub fn trade_size(&self, coin_type: &str) -> Option<u64> {
        self.coins.trade_size(coin_type)
    }

    pub fn coins(&self) -> &CoinRegistry {
        self.coins
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Pools whose observations this strategy reads. It is skipped for any tick
    /// where one of them has never been observed.
    fn subscriptions(&self) -> &[PoolId];

    /// Checked once, when the strategy is added to the orchestrator.
    fn validate(&self, pools: &PoolRegistry, coins: &CoinRegistry) -> Result<(), ArbError>;

    fn evaluate(&mut self, snapshot: &MarketSnapshot<'_>) -> Vec<TradeIntent>;

    /// One of this strategy's intents was refused before submission (lock held,
    /// gas ceiling, no gas price). Stateless strategies ignore it.
    fn on_intent_dropped(&mut self, _intent: &TradeIntent) {}

    fn state(&self) -> StrategyState;
}
