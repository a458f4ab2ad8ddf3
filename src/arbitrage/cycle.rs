// src/arbitrage/cycle.rs
//! Cycle arbitrage: simulate a closed loop of swaps and trade it when the
//! round trip returns more than it started with.

use crate::arbitrage::registry::PoolRegistry;
use crate::arbitrage::strategy::{MarketSnapshot, Strategy};
use crate::arbitrage::types::{StrategyContext, StrategyState, TradeIntent};
use crate::dex::{PoolId, SwapDirection};
use crate::error::ArbError;
use crate::sui::CoinRegistry;
use itertools::Itertools;
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleLeg {
    pub pool_id: PoolId,
    pub direction: SwapDirection,
}

impl CycleLeg {
    pub fn new(pool_id: PoolId, direction: SwapDirection) -> Self {
        Self { pool_id, direction }
    }
}

pub struct Arbitrage {
    label: String,
    legs: Vec<CycleLeg>,
    threshold: f64,
    max_slippage_bps: u16,
    trade_size: Option<u64>,
    context: StrategyContext,
}

impl Arbitrage {
    pub fn new(
        label: &str,
        legs: Vec<CycleLeg>,
        threshold: f64,
        max_slippage_bps: u16,
    ) -> Result<Self, ArbError> {
        if legs.len() < 2 {
            return Err(ArbError::ConfigError(format!(
                "{}: a cycle needs at least two legs, got {}",
                label,
                legs.len()
            )));
        }
        if !threshold.is_finite() || threshold <= 1.0 {
            return Err(ArbError::ConfigError(format!(
                "{}: threshold must be a finite multiplier above 1.0, got {}",
                label, threshold
            )));
        }
        // Legs are dispatched back to back, each holding its pool's lock, so a
        // second leg on the same pool would always lose the lock to the first.
        if let Some(pool_id) = legs.iter().map(|leg| leg.pool_id).duplicates().next() {
            return Err(ArbError::ConfigError(format!(
                "{}: pool {} appears in more than one leg",
                label, pool_id
            )));
        }
        let subscriptions: Vec<PoolId> = legs.iter().map(|leg| leg.pool_id).collect();
        Ok(Self {
            label: label.to_string(),
            legs,
            threshold,
            max_slippage_bps,
            trade_size: None,
            context: StrategyContext::new(subscriptions),
        })
    }

    /// Fixed starting amount instead of the coin table's trade size.
    pub fn with_trade_size(mut self, amount: u64) -> Self {
        self.trade_size = Some(amount);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn legs(&self) -> &[CycleLeg] {
        &self.legs
    }

    pub fn context(&self) -> &StrategyContext {
        &self.context
    }

    /// Walks the legs with `estimate_swap`; any failing leg aborts the whole cycle.
    fn find_opportunity(&self, snapshot: &MarketSnapshot<'_>) -> Result<Vec<TradeIntent>, ArbError> {
        let first = self.legs[0];
        let start_coin = snapshot.input_coin(&first.pool_id, first.direction)?;
        let initial = match self.trade_size.or_else(|| snapshot.trade_size(start_coin)) {
            Some(amount) if amount > 0 => amount,
            _ => {
                return Err(ArbError::ConfigError(format!(
                    "{}: no trade size for {}",
                    self.label, start_coin
                )))
            }
        };

        let mut amount = initial;
        let mut sized = Vec::with_capacity(self.legs.len());
        for leg in &self.legs {
            let estimate = snapshot.estimate_swap(&leg.pool_id, leg.direction, amount)?;
            sized.push((*leg, amount));
            amount = estimate.expected_output;
            if amount == 0 {
                return Err(ArbError::InsufficientLiquidity(format!(
                    "{}: leg on pool {} yields nothing",
                    self.label, leg.pool_id
                )));
            }
        }

        let multiplier = amount as f64 / initial as f64;
        if multiplier <= self.threshold {
            debug!(
                "{}: round trip {:.6} <= {:.6}, nothing to do",
                self.label, multiplier, self.threshold
            );
            return Ok(Vec::new());
        }

        info!(
            "💰 {}: round trip {:.6} > {:.6} ({} -> {})",
            self.label,
            multiplier,
            self.threshold,
            snapshot.coins().format_amount(start_coin, initial),
            snapshot.coins().format_amount(start_coin, amount)
        );
        sized
            .into_iter()
            .map(|(leg, input)| {
                TradeIntent::new(leg.pool_id, leg.direction, input, self.max_slippage_bps, &self.label)
            })
            .collect()
    }
}

impl Strategy for Arbitrage {
    fn name(&self) -> &str {
        &self.label
    }

    fn subscriptions(&self) -> &[PoolId] {
        &self.context.subscriptions
    }

    fn validate(&self, pools: &PoolRegistry, coins: &CoinRegistry) -> Result<(), ArbError> {
        let mut flows = Vec::with_capacity(self.legs.len());
        for leg in &self.legs {
            let adapter = pools.get(&leg.pool_id).ok_or_else(|| {
                ArbError::ConfigError(format!(
                    "{}: leg references unknown pool {}",
                    self.label, leg.pool_id
                ))
            })?;
            let spec = adapter.spec();
            let (coin_in, coin_out) = leg.direction.coins(&spec.coin_a, &spec.coin_b);
            flows.push((coin_in.to_string(), coin_out.to_string()));
        }

        for (i, (_, coin_out)) in flows.iter().enumerate() {
            let (next_in, _) = &flows[(i + 1) % flows.len()];
            if coin_out != next_in {
                return Err(ArbError::ConfigError(format!(
                    "{}: leg {} ends in {} but leg {} starts from {}",
                    self.label,
                    i + 1,
                    coin_out,
                    (i + 1) % flows.len() + 1,
                    next_in
                )));
            }
        }

        let start = &flows[0].0;
        if self.trade_size.is_none() && coins.trade_size(start).is_none() {
            return Err(ArbError::ConfigError(format!(
                "{}: no trade size configured for {}",
                self.label, start
            )));
        }
        Ok(())
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot<'_>) -> Vec<TradeIntent> {
        self.context.begin_evaluation();

        let missing = self
            .legs
            .iter()
            .any(|leg| snapshot.observation(&leg.pool_id).is_none());
        let intents = if missing {
            debug!("{}: waiting for first observation of every leg", self.label);
            Vec::new()
        } else {
            self.find_opportunity(snapshot).unwrap_or_else(|e| {
                debug!("{}: cycle aborted: {}", self.label, e);
                Vec::new()
            })
        };

        self.context.finish(intents, snapshot.taken_at())
    }

    fn state(&self) -> StrategyState {
        self.context.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::{PoolAdapter, PriceObservation};
    use crate::testing::MockPoolAdapter;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Arc;

    const SUI: &str = "0x2::sui::SUI";
    const USDC: &str = "0xusdc::coin::COIN";
    const ONE_SUI: u64 = 1_000_000_000;

    struct Market {
        pools: PoolRegistry,
        coins: CoinRegistry,
        p1: PoolId,
        p2: PoolId,
        p1_adapter: Arc<MockPoolAdapter>,
    }

    fn market(usdc_to_sui: f64) -> Market {
        let mut pools = PoolRegistry::new();
        let p1_adapter = Arc::new(MockPoolAdapter::new("p1", SUI, USDC, 1.0));
        let p1 = pools.register(p1_adapter.clone());
        let p2 = pools.register(Arc::new(MockPoolAdapter::new("p2", USDC, SUI, usdc_to_sui)));
        let mut coins = CoinRegistry::new();
        coins.insert("SUI", SUI, ONE_SUI, Some(9));
        coins.insert("USDC", USDC, ONE_SUI, Some(9));
        Market {
            pools,
            coins,
            p1,
            p2,
            p1_adapter,
        }
    }

    fn observe(market: &Market, ids: &[PoolId]) -> HashMap<PoolId, PriceObservation> {
        ids.iter()
            .map(|id| {
                let spec = market.pools.get(id).unwrap().spec();
                (*id, PriceObservation::new(*id, &spec.coin_a, &spec.coin_b, 1.0, Utc::now()).unwrap())
            })
            .collect()
    }

    fn cycle(market: &Market) -> Arbitrage {
        Arbitrage::new(
            "sui-usdc",
            vec![
                CycleLeg::new(market.p1, SwapDirection::AToB),
                CycleLeg::new(market.p2, SwapDirection::AToB),
            ],
            1.0005,
            50,
        )
        .unwrap()
    }

    #[test]
    fn profitable_cycle_emits_one_intent_per_leg() {
        let m = market(1.0006);
        let mut strategy = cycle(&m);
        strategy.validate(&m.pools, &m.coins).unwrap();

        let snapshot = MarketSnapshot::new(observe(&m, &[m.p1, m.p2]), &m.pools, &m.coins, Utc::now());
        let intents = strategy.evaluate(&snapshot);

        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].pool_id(), m.p1);
        assert_eq!(intents[0].input_amount(), ONE_SUI);
        assert_eq!(intents[1].pool_id(), m.p2);
        assert_eq!(intents[1].input_amount(), ONE_SUI);
        assert_eq!(strategy.state(), StrategyState::TradeEmitted);
    }

    #[test]
    fn below_threshold_emits_nothing() {
        let m = market(1.0003);
        let mut strategy = cycle(&m);
        let snapshot = MarketSnapshot::new(observe(&m, &[m.p1, m.p2]), &m.pools, &m.coins, Utc::now());
        assert!(strategy.evaluate(&snapshot).is_empty());
        assert_eq!(strategy.state(), StrategyState::Idle);
    }

    #[test]
    fn exactly_at_threshold_does_not_trigger() {
        let m = market(1.0005);
        let mut strategy = cycle(&m).with_trade_size(2_000);
        let snapshot = MarketSnapshot::new(observe(&m, &[m.p1, m.p2]), &m.pools, &m.coins, Utc::now());
        // 2000 -> 2000 -> 2001: multiplier 1.0005 exactly.
        assert!(strategy.evaluate(&snapshot).is_empty());
    }

    #[test]
    fn leg_liquidity_failure_aborts_cycle() {
        let m = market(1.01);
        m.p1_adapter.fail_liquidity(true);
        let mut strategy = cycle(&m);
        let snapshot = MarketSnapshot::new(observe(&m, &[m.p1, m.p2]), &m.pools, &m.coins, Utc::now());
        assert!(strategy.evaluate(&snapshot).is_empty());
    }

    #[test]
    fn missing_observation_skips_evaluation() {
        let m = market(1.01);
        let mut strategy = cycle(&m);
        let snapshot = MarketSnapshot::new(observe(&m, &[m.p2]), &m.pools, &m.coins, Utc::now());
        assert!(strategy.evaluate(&snapshot).is_empty());
        assert_eq!(strategy.state(), StrategyState::Idle);
    }

    #[test]
    fn rejects_bad_configuration() {
        let m = market(1.0);
        let legs = vec![
            CycleLeg::new(m.p1, SwapDirection::AToB),
            CycleLeg::new(m.p2, SwapDirection::AToB),
        ];
        assert!(Arbitrage::new("x", legs.clone(), 1.0, 50).is_err());
        assert!(Arbitrage::new("x", legs.clone(), f64::NAN, 50).is_err());
        assert!(Arbitrage::new("x", legs[..1].to_vec(), 1.01, 50).is_err());

        // P2 B->A consumes SUI but leg one produces USDC.
        let broken = Arbitrage::new(
            "x",
            vec![
                CycleLeg::new(m.p1, SwapDirection::AToB),
                CycleLeg::new(m.p2, SwapDirection::BToA),
            ],
            1.01,
            50,
        )
        .unwrap();
        assert!(matches!(
            broken.validate(&m.pools, &m.coins),
            Err(ArbError::ConfigError(_))
        ));

        let unknown = Arbitrage::new(
            "x",
            vec![
                CycleLeg::new(m.p1, SwapDirection::AToB),
                CycleLeg::new(PoolId::new(), SwapDirection::AToB),
            ],
            1.01,
            50,
        )
        .unwrap();
        assert!(unknown.validate(&m.pools, &m.coins).is_err());
    }

    #[test]
    fn rejects_cycle_revisiting_a_pool() {
        let mut pools = PoolRegistry::new();
        let p1 = pools.register(Arc::new(MockPoolAdapter::new("p1", SUI, USDC, 1.0)));
        let p2 = pools.register(Arc::new(MockPoolAdapter::new("p2", USDC, "0xc::c::C", 1.0)));
        let p3 = pools.register(Arc::new(MockPoolAdapter::new("p3", "0xc::c::C", USDC, 1.0)));

        // SUI -> USDC -> C -> USDC -> SUI is coin-continuous but trades P1 twice.
        let result = Arbitrage::new(
            "revisit",
            vec![
                CycleLeg::new(p1, SwapDirection::AToB),
                CycleLeg::new(p2, SwapDirection::AToB),
                CycleLeg::new(p3, SwapDirection::AToB),
                CycleLeg::new(p1, SwapDirection::BToA),
            ],
            1.0005,
            50,
        );
        match result {
            Err(ArbError::ConfigError(msg)) => assert!(msg.contains(&p1.to_string())),
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("cycle revisiting a pool was accepted"),
        }
    }
}
