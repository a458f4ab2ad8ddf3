//! Cross-venue price difference on one pair: when the same coin is priced
//! noticeably cheaper on one pool than on another, buy it where it is cheap.

use crate::arbitrage::registry::PoolRegistry;
use crate::arbitrage::strategy::{MarketSnapshot, Strategy};
use crate::arbitrage::types::{StrategyContext, StrategyState, TradeIntent};
use crate::dex::{PoolId, PriceObservation, SwapDirection};
use crate::error::ArbError;
use crate::sui::CoinRegistry;
use itertools::Itertools;
use log::{debug, info};

pub struct MarketDifference {
    label: String,
    pools: Vec<PoolId>,
    limit: f64,
    max_slippage_bps: u16,
    /// (base, quote) coin types, fixed by the first pool's `coin_a`/`coin_b`.
    pair: Option<(String, String)>,
    context: StrategyContext,
}

impl MarketDifference {
    pub fn new(
        label: &str,
        pools: Vec<PoolId>,
        limit: f64,
        max_slippage_bps: u16,
    ) -> Result<Self, ArbError> {
        if pools.len() < 2 {
            return Err(ArbError::ConfigError(format!(
                "{}: comparing prices needs at least two pools, got {}",
                label,
                pools.len()
            )));
        }
        if let Some(pool_id) = pools.iter().duplicates().next() {
            return Err(ArbError::ConfigError(format!(
                "{}: pool {} listed twice",
                label, pool_id
            )));
        }
        if !limit.is_finite() || limit <= 1.0 {
            return Err(ArbError::ConfigError(format!(
                "{}: limit must be a finite ratio above 1.0, got {}",
                label, limit
            )));
        }
        Ok(Self {
            label: label.to_string(),
            context: StrategyContext::new(pools.clone()),
            pools,
            limit,
            max_slippage_bps,
            pair: None,
        })
    }

    /// The (base, quote) pair every listed pool must trade, in either order.
    fn resolve_pair(&self, pools: &PoolRegistry) -> Result<(String, String), ArbError> {
        let mut pair: Option<(String, String)> = None;
        for pool_id in &self.pools {
            let spec = pools
                .get(pool_id)
                .ok_or_else(|| {
                    ArbError::ConfigError(format!("{}: unknown pool {}", self.label, pool_id))
                })?
                .spec();
            match &pair {
                None => pair = Some((spec.coin_a.clone(), spec.coin_b.clone())),
                Some((base, quote)) => {
                    let same = (&spec.coin_a == base && &spec.coin_b == quote)
                        || (&spec.coin_a == quote && &spec.coin_b == base);
                    if !same {
                        return Err(ArbError::ConfigError(format!(
                            "{}: pool {} trades {}/{}, expected {}/{}",
                            self.label, pool_id, spec.coin_a, spec.coin_b, base, quote
                        )));
                    }
                }
            }
        }
        pair.ok_or_else(|| ArbError::ConfigError(format!("{}: no pools", self.label)))
    }

    /// Price of one raw unit of `base` in raw units of the other coin.
    fn base_price(observation: &PriceObservation, base: &str) -> f64 {
        if observation.coin_a == base {
            observation.price_a_to_b
        } else {
            observation.price_b_to_a()
        }
    }

    fn compare(&mut self, snapshot: &MarketSnapshot<'_>) -> Result<Vec<TradeIntent>, ArbError> {
        if self.pair.is_none() {
            self.pair = Some(self.resolve_pair(snapshot.pools())?);
        }
        let (base, quote) = self
            .pair
            .clone()
            .ok_or_else(|| ArbError::ConfigError(format!("{}: no pair", self.label)))?;

        let mut prices = Vec::with_capacity(self.pools.len());
        for pool_id in &self.pools {
            let Some(observation) = snapshot.observation(pool_id) else {
                return Ok(Vec::new());
            };
            prices.push((*pool_id, observation, Self::base_price(observation, &base)));
        }

        let cheapest = prices
            .iter()
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .ok_or_else(|| ArbError::ConfigError(format!("{}: no pools", self.label)))?;
        let dearest = prices
            .iter()
            .max_by(|a, b| a.2.total_cmp(&b.2))
            .ok_or_else(|| ArbError::ConfigError(format!("{}: no pools", self.label)))?;

        let ratio = dearest.2 / cheapest.2;
        if ratio <= self.limit {
            debug!("{}: spread {:.6} <= {:.6}", self.label, ratio, self.limit);
            return Ok(Vec::new());
        }

        // Pay `quote` on the cheap pool to receive `base`.
        let (pool_id, observation) = (cheapest.0, cheapest.1);
        let direction = if observation.coin_a == base {
            SwapDirection::BToA
        } else {
            SwapDirection::AToB
        };
        let amount = snapshot.trade_size(&quote).ok_or_else(|| {
            ArbError::ConfigError(format!("{}: no trade size for {}", self.label, quote))
        })?;
        let estimate = snapshot.estimate_swap(&pool_id, direction, amount)?;

        info!(
            "🔀 {}: {} is {:.4}x cheaper on pool {} than on {}, swapping {} (expect {} out)",
            self.label,
            snapshot.coins().symbol(&base),
            ratio,
            pool_id,
            dearest.0,
            snapshot.coins().format_amount(&quote, amount),
            snapshot.coins().format_amount(&base, estimate.expected_output)
        );
        Ok(vec![TradeIntent::new(
            pool_id,
            direction,
            amount,
            self.max_slippage_bps,
            &self.label,
        )?])
    }
}

impl Strategy for MarketDifference {
    fn name(&self) -> &str {
        &self.label
    }

    fn subscriptions(&self) -> &[PoolId] {
        &self.context.subscriptions
    }

    fn validate(&self, pools: &PoolRegistry, coins: &CoinRegistry) -> Result<(), ArbError> {
        let (_, quote) = self.resolve_pair(pools)?;
        if coins.trade_size(&quote).is_none() {
            return Err(ArbError::ConfigError(format!(
                "{}: no trade size configured for {}",
                self.label, quote
            )));
        }
        Ok(())
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot<'_>) -> Vec<TradeIntent> {
        self.context.begin_evaluation();
        let intents = self.compare(snapshot).unwrap_or_else(|e| {
            debug!("{}: no trade this tick: {}", self.label, e);
            Vec::new()
        });
        self.context.finish(intents, snapshot.taken_at())
    }

    fn state(&self) -> StrategyState {
        self.context.state
    }
}
