//! Core Arbitrage Orchestrator Structure
//!
//! Owns the registered pools and strategies and drives the tick loop:
//! poll every pool, evaluate every strategy, dispatch what they emit.

use super::{
    concurrency_manager::ExecutionLocks, detection_engine::PollSummary,
    execution_manager::DispatchSummary,
};
use crate::{
    arbitrage::{
        metrics::{OrchestratorMetrics, SUMMARY_EVERY_TICKS},
        price_cache::PriceCache,
        registry::PoolRegistry,
        strategy::Strategy,
        types::{DroppedIntent, ExecutionOutcome, StrategyState},
    },
    dex::{PoolAdapter, PoolId},
    error::ArbError,
    sui::{CoinRegistry, NetworkClient},
    utils::short_address,
};

use log::{debug, error, info};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

/// Global limits applied to every intent regardless of strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskLimits {
    /// Highest acceptable reference gas price, in MIST per gas unit.
    pub max_gas_price: u64,
    /// Upper bound on any intent's slippage tolerance.
    pub max_slippage_bps: u16,
    /// Warn about pools whose last observation is older than this.
    pub stale_after: Option<Duration>,
}

/// Everything one tick did. Execution handles are detached unless a caller
/// awaits them through [`TickReport::join_executions`].
#[derive(Debug)]
pub struct TickReport {
    pub tick: u64,
    pub polls: PollSummary,
    pub intents_emitted: usize,
    pub strategies_skipped: usize,
    pub dropped: Vec<DroppedIntent>,
    pub executions: Vec<JoinHandle<ExecutionOutcome>>,
}

impl TickReport {
    pub async fn join_executions(self) -> Vec<ExecutionOutcome> {
        let mut outcomes = Vec::with_capacity(self.executions.len());
        for handle in self.executions {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Execution task failed to complete: {}", e),
            }
        }
        outcomes
    }

    fn log(&self) {
        debug!(
            "Tick {}: quotes {} ok / {} failed / {} late, {} intent(s), {} skipped, {} dropped, {} dispatched",
            self.tick,
            self.polls.succeeded,
            self.polls.failed,
            self.polls.timed_out,
            self.intents_emitted,
            self.strategies_skipped,
            self.dropped.len(),
            self.executions.len()
        );
    }
}

/// The main arbitrage orchestrator - central coordinator for polling, strategy
/// evaluation and per-pool serialized execution.
pub struct ArbitrageOrchestrator {
    pub(crate) limits: RiskLimits,
    pub(crate) network: Arc<dyn NetworkClient>,
    pub(crate) coins: Arc<CoinRegistry>,
    pub(crate) pools: PoolRegistry,
    pub(crate) strategies: Vec<Box<dyn Strategy>>,
    pub(crate) price_cache: Arc<PriceCache>,
    pub(crate) execution_locks: ExecutionLocks,
    pub(crate) metrics: Arc<OrchestratorMetrics>,
}

impl ArbitrageOrchestrator {
    pub fn new(limits: RiskLimits, network: Arc<dyn NetworkClient>, coins: Arc<CoinRegistry>) -> Self {
        Self {
            limits,
            network,
            coins,
            pools: PoolRegistry::new(),
            strategies: Vec::new(),
            price_cache: Arc::new(PriceCache::new()),
            execution_locks: ExecutionLocks::new(),
            metrics: Arc::new(OrchestratorMetrics::new()),
        }
    }

    /// Registers a pool and returns its new id. Adding the same address twice
    /// creates two pools with separate locks.
    pub fn add_pool(&mut self, adapter: Arc<dyn PoolAdapter>) -> PoolId {
        let (venue, address) = (adapter.spec().venue.clone(), adapter.spec().address.clone());
        let pool_id = self.pools.register(adapter);
        self.execution_locks.register(pool_id);
        info!("🏊 Registered {} pool {} as {}", venue, short_address(&address), pool_id);
        pool_id
    }

    /// Strategy names must be unique: dropped intents are routed back by name.
    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) -> Result<(), ArbError> {
        if self.strategies.iter().any(|s| s.name() == strategy.name()) {
            return Err(ArbError::ConfigError(format!(
                "strategy {} is already registered",
                strategy.name()
            )));
        }
        strategy.validate(&self.pools, &self.coins)?;
        info!(
            "🧠 Strategy {} subscribed to {} pool(s)",
            strategy.name(),
            strategy.subscriptions().len()
        );
        self.strategies.push(strategy);
        Ok(())
    }

    /// One full poll -> evaluate -> dispatch cycle.
    pub async fn tick(&mut self, evaluation_delay: Duration) -> TickReport {
        let tick = self.metrics.record_tick();

        let polls = self.poll_pools(evaluation_delay).await;
        self.warn_stale_pools();

        let (intents, strategies_skipped) = self.evaluate_strategies();
        let intents_emitted = intents.len();

        let DispatchSummary {
            dropped,
            executions,
        } = self.dispatch_intents(intents).await;
        self.return_dropped(&dropped);

        if tick % SUMMARY_EVERY_TICKS == 0 {
            info!("📊 {}", self.metrics.report());
        }

        let report = TickReport {
            tick,
            polls,
            intents_emitted,
            strategies_skipped,
            dropped,
            executions,
        };
        report.log();
        report
    }

    fn return_dropped(&mut self, dropped: &[DroppedIntent]) {
        for DroppedIntent { intent, .. } in dropped {
            if let Some(strategy) = self
                .strategies
                .iter_mut()
                .find(|s| s.name() == intent.strategy())
            {
                strategy.on_intent_dropped(intent);
            }
        }
    }

    /// Ticks every `poll_interval`, forever.
    pub async fn run(self, poll_interval: Duration, evaluation_delay: Duration) {
        self.run_until(poll_interval, evaluation_delay, std::future::pending())
            .await
    }

    /// Ticks every `poll_interval` until `shutdown` resolves. A tick in progress
    /// always completes; in-flight executions are left to finish on their own.
    pub async fn run_until<F>(mut self, poll_interval: Duration, evaluation_delay: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "🚀 Orchestrator running: {} pool(s), {} strategy(ies), tick {:?}, poll deadline {:?}",
            self.pools.len(),
            self.strategies.len(),
            poll_interval,
            evaluation_delay
        );
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("🛑 Shutdown requested, stopping after {} tick(s)", self.metrics.snapshot().ticks);
                    info!("📊 {}", self.metrics.report());
                    break;
                }
                _ = ticker.tick() => {}
            }
            self.tick(evaluation_delay).await;
        }
    }

    /// Runs the loop as a background task.
    pub fn spawn(self, poll_interval: Duration, evaluation_delay: Duration) -> JoinHandle<()> {
        tokio::spawn(self.run(poll_interval, evaluation_delay))
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn price_cache(&self) -> Arc<PriceCache> {
        self.price_cache.clone()
    }

    pub fn metrics(&self) -> Arc<OrchestratorMetrics> {
        self.metrics.clone()
    }

    pub fn pool_ids(&self) -> &[PoolId] {
        self.pools.ids()
    }

    pub fn pool(&self, pool_id: &PoolId) -> Option<&Arc<dyn PoolAdapter>> {
        self.pools.get(pool_id)
    }

    pub fn strategy_states(&self) -> Vec<(String, StrategyState)> {
        self.strategies
            .iter()
            .map(|s| (s.name().to_string(), s.state()))
            .collect()
    }

    pub fn is_pool_busy(&self, pool_id: PoolId) -> bool {
        self.execution_locks.is_busy(pool_id)
    }
}
