// src/arbitrage/trend.rs
//! Moving-average trend follower on a single pool.

use crate::arbitrage::registry::PoolRegistry;
use crate::arbitrage::strategy::{MarketSnapshot, Strategy};
use crate::arbitrage::types::{StrategyContext, StrategyState, TradeIntent};
use crate::dex::{PoolId, SwapDirection};
use crate::error::ArbError;
use crate::sui::CoinRegistry;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::VecDeque;

pub struct RideTheTrend {
    label: String,
    pool_id: PoolId,
    short_window: usize,
    long_window: usize,
    limit: f64,
    max_slippage_bps: u16,
    history: VecDeque<f64>,
    last_seen: Option<DateTime<Utc>>,
    position: Option<SwapDirection>,
    /// Side held before the last emission, restored if that trade is dropped.
    prior_position: Option<SwapDirection>,
    context: StrategyContext,
}

impl RideTheTrend {
    pub fn new(
        label: &str,
        pool_id: PoolId,
        short_window: usize,
        long_window: usize,
        limit: f64,
        max_slippage_bps: u16,
    ) -> Result<Self, ArbError> {
        if short_window == 0 || short_window >= long_window {
            return Err(ArbError::ConfigError(format!(
                "{}: need 0 < short_window < long_window, got {} / {}",
                label, short_window, long_window
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
            pool_id,
            short_window,
            long_window,
            limit,
            max_slippage_bps,
            history: VecDeque::with_capacity(long_window),
            last_seen: None,
            position: None,
            prior_position: None,
            context: StrategyContext::new(vec![pool_id]),
        })
    }

    /// Direction of the last emitted trade, i.e. which side of the trend we hold.
    pub fn position(&self) -> Option<SwapDirection> {
        self.position
    }

    fn mean(values: impl Iterator<Item = f64>) -> f64 {
        let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    /// `BToA` (buy A) on an uptrend, `AToB` (sell A) on a downtrend.
    fn trend(&self) -> Option<SwapDirection> {
        if self.history.len() < self.long_window {
            return None;
        }
        let long = Self::mean(self.history.iter().copied());
        let short = Self::mean(
            self.history
                .iter()
                .skip(self.long_window - self.short_window)
                .copied(),
        );
        if short / long > self.limit {
            Some(SwapDirection::BToA)
        } else if long / short > self.limit {
            Some(SwapDirection::AToB)
        } else {
            None
        }
    }

    fn follow(&mut self, snapshot: &MarketSnapshot<'_>) -> Result<Vec<TradeIntent>, ArbError> {
        let Some(observation) = snapshot.observation(&self.pool_id) else {
            return Ok(Vec::new());
        };
        if self.last_seen == Some(observation.timestamp) {
            return Ok(Vec::new());
        }
        self.last_seen = Some(observation.timestamp);
        self.history.push_back(observation.price_a_to_b);
        while self.history.len() > self.long_window {
            self.history.pop_front();
        }

        let direction = match self.trend() {
            Some(direction) if self.position != Some(direction) => direction,
            _ => return Ok(Vec::new()),
        };

        let coin_in = snapshot.input_coin(&self.pool_id, direction)?;
        let amount = snapshot.trade_size(coin_in).ok_or_else(|| {
            ArbError::ConfigError(format!("{}: no trade size for {}", self.label, coin_in))
        })?;
        let estimate = snapshot.estimate_swap(&self.pool_id, direction, amount)?;

        info!(
            "📈 {}: trend turned {} on pool {}, swapping {} (expect {} out)",
            self.label,
            direction,
            self.pool_id,
            snapshot.coins().format_amount(coin_in, amount),
            estimate.expected_output
        );
        let intent = TradeIntent::new(self.pool_id, direction, amount, self.max_slippage_bps, &self.label)?;
        self.prior_position = self.position.replace(direction);
        Ok(vec![intent])
    }
}

impl Strategy for RideTheTrend {
    fn name(&self) -> &str {
        &self.label
    }

    fn subscriptions(&self) -> &[PoolId] {
        &self.context.subscriptions
    }

    fn validate(&self, pools: &PoolRegistry, coins: &CoinRegistry) -> Result<(), ArbError> {
        let adapter = pools.get(&self.pool_id).ok_or_else(|| {
            ArbError::ConfigError(format!("{}: unknown pool {}", self.label, self.pool_id))
        })?;
        let spec = adapter.spec();
        for coin in [&spec.coin_a, &spec.coin_b] {
            if coins.trade_size(coin).is_none() {
                return Err(ArbError::ConfigError(format!(
                    "{}: no trade size configured for {}",
                    self.label, coin
                )));
            }
        }
        Ok(())
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot<'_>) -> Vec<TradeIntent> {
        self.context.begin_evaluation();
        let intents = self.follow(snapshot).unwrap_or_else(|e| {
            debug!("{}: no trade this tick: {}", self.label, e);
            Vec::new()
        });
        self.context.finish(intents, snapshot.taken_at())
    }

    fn on_intent_dropped(&mut self, intent: &TradeIntent) {
        if intent.pool_id() == self.pool_id && self.position == Some(intent.direction()) {
            debug!(
                "{}: {} trade was not sent, still holding {:?}",
                self.label,
                intent.direction(),
                self.prior_position
            );
            self.position = self.prior_position.take();
        }
    }

    fn state(&self) -> StrategyState {
        self.context.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::PriceObservation;
    use crate::testing::MockPoolAdapter;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::Arc;

    const SUI: &str = "0x2::sui::SUI";
    const USDC: &str = "0xusdc::coin::COIN";

    fn setup() -> (PoolRegistry, CoinRegistry, PoolId) {
        let mut pools = PoolRegistry::new();
        let id = pools.register(Arc::new(MockPoolAdapter::new("cetus", SUI, USDC, 1.0)));
        let mut coins = CoinRegistry::new();
        coins.insert("SUI", SUI, 1_000, Some(9));
        coins.insert("USDC", USDC, 3_000, Some(6));
        (pools, coins, id)
    }

    fn feed(
        strategy: &mut RideTheTrend,
        pools: &PoolRegistry,
        coins: &CoinRegistry,
        id: PoolId,
        prices: &[f64],
    ) -> Vec<Vec<TradeIntent>> {
        let start = Utc::now();
        prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let at = start + Duration::seconds(i as i64);
                let obs = PriceObservation::new(id, SUI, USDC, *price, at).unwrap();
                let snapshot = MarketSnapshot::new(HashMap::from([(id, obs)]), pools, coins, at);
                strategy.evaluate(&snapshot)
            })
            .collect()
    }

    #[test]
    fn buys_once_on_uptrend() {
        let (pools, coins, id) = setup();
        let mut strategy = RideTheTrend::new("trend", id, 2, 4, 1.01, 50).unwrap();
        strategy.validate(&pools, &coins).unwrap();

        let out = feed(&mut strategy, &pools, &coins, id, &[1.0, 1.0, 1.1, 1.2, 1.3]);
        let emitted: Vec<&TradeIntent> = out.iter().flatten().collect();

        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].direction(), SwapDirection::BToA);
        assert_eq!(emitted[0].input_amount(), 3_000);
        assert_eq!(strategy.position(), Some(SwapDirection::BToA));
    }

    #[test]
    fn flips_to_sell_on_downtrend() {
        let (pools, coins, id) = setup();
        let mut strategy = RideTheTrend::new("trend", id, 2, 4, 1.01, 50).unwrap();

        let out = feed(
            &mut strategy,
            &pools,
            &coins,
            id,
            &[1.0, 1.0, 1.2, 1.2, 0.9, 0.8],
        );
        let emitted: Vec<&TradeIntent> = out.iter().flatten().collect();
        let directions: Vec<SwapDirection> = emitted.iter().map(|i| i.direction()).collect();
        assert_eq!(directions, vec![SwapDirection::BToA, SwapDirection::AToB]);
        // Selling A is sized from coin A's trade size.
        assert_eq!(emitted[1].input_amount(), 1_000);
    }

    #[test]
    fn flat_market_and_short_history_stay_idle() {
        let (pools, coins, id) = setup();
        let mut strategy = RideTheTrend::new("trend", id, 2, 4, 1.01, 50).unwrap();
        let out = feed(&mut strategy, &pools, &coins, id, &[1.0, 1.001, 0.999, 1.0, 1.0]);
        assert!(out.iter().all(Vec::is_empty));
        assert_eq!(strategy.state(), StrategyState::Idle);
    }

    #[test]
    fn dropped_trade_is_retried_while_trend_holds() {
        let (pools, coins, id) = setup();
        let mut strategy = RideTheTrend::new("trend", id, 2, 4, 1.01, 50).unwrap();

        let out = feed(&mut strategy, &pools, &coins, id, &[1.0, 1.0, 1.1, 1.2]);
        let buy = out.into_iter().flatten().next().unwrap();
        assert_eq!(buy.direction(), SwapDirection::BToA);

        strategy.on_intent_dropped(&buy);
        assert_eq!(strategy.position(), None);

        // Still trending up: the buy is emitted again.
        let start = Utc::now() + Duration::seconds(60);
        let obs = PriceObservation::new(id, SUI, USDC, 1.3, start).unwrap();
        let snapshot = MarketSnapshot::new(HashMap::from([(id, obs)]), &pools, &coins, start);
        let again = strategy.evaluate(&snapshot);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].direction(), SwapDirection::BToA);
        assert_eq!(strategy.position(), Some(SwapDirection::BToA));
    }

    #[test]
    fn rejects_bad_windows() {
        let id = PoolId::new();
        assert!(RideTheTrend::new("t", id, 4, 4, 1.01, 50).is_err());
        assert!(RideTheTrend::new("t", id, 0, 4, 1.01, 50).is_err());
        assert!(RideTheTrend::new("t", id, 2, 4, 0.99, 50).is_err());
    }
}
