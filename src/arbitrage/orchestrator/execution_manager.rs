//! Execution Manager Module
//!
//! Turns intents into spawned swap executions, applying the per-pool lock, the gas
//! ceiling and the slippage guard in that order.

use super::core::ArbitrageOrchestrator;
use crate::{
    arbitrage::{
        metrics::OrchestratorMetrics,
        types::{DroppedIntent, ExecutionOutcome, TradeIntent},
    },
    dex::PoolAdapter,
    error::ArbError,
    sui::CoinRegistry,
    utils::short_address,
};

use log::{error, info, warn};
use std::sync::Arc;
use tokio::{sync::OwnedMutexGuard, task::JoinHandle};

#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub dropped: Vec<DroppedIntent>,
    pub executions: Vec<JoinHandle<ExecutionOutcome>>,
}

impl ArbitrageOrchestrator {
    /// Dispatches intents in emission order. The network gas price is read once,
    /// and only when there is something to dispatch.
    pub(crate) async fn dispatch_intents(&self, intents: Vec<TradeIntent>) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        if intents.is_empty() {
            return summary;
        }

        let gas_price = match self.network.reference_gas_price().await {
            Ok(price) => Ok(price),
            Err(e) => {
                warn!("⚠️ Could not read reference gas price: {}; holding this tick's trades", e);
                Err(ArbError::NetworkError(e.to_string()))
            }
        };

        for intent in intents {
            match self.prepare(&intent, &gas_price) {
                Ok((adapter, min_output, guard)) => {
                    let handle = tokio::spawn(execute_intent(
                        adapter,
                        intent,
                        min_output,
                        guard,
                        self.metrics.clone(),
                        self.coins.clone(),
                    ));
                    summary.executions.push(handle);
                }
                Err(reason) => {
                    match &reason {
                        ArbError::LockContention(_) => info!(
                            "🔒 Dropping {} intent on pool {}: previous trade still in flight",
                            intent.strategy(),
                            intent.pool_id()
                        ),
                        other => warn!(
                            "🚫 Dropping {} intent on pool {} [{}]: {}",
                            intent.strategy(),
                            intent.pool_id(),
                            other.category(),
                            other
                        ),
                    }
                    self.metrics.record_drop(&reason);
                    summary.dropped.push(DroppedIntent { intent, reason });
                }
            }
        }
        summary
    }

    /// Every check that can refuse an intent before it reaches the chain. On any
    /// error the lock guard (if taken) is dropped here, releasing the pool.
    fn prepare(
        &self,
        intent: &TradeIntent,
        gas_price: &Result<u64, ArbError>,
    ) -> Result<(Arc<dyn PoolAdapter>, u64, OwnedMutexGuard<()>), ArbError> {
        let adapter = self
            .pools
            .get(&intent.pool_id())
            .cloned()
            .ok_or_else(|| ArbError::PoolNotFound(intent.pool_id().to_string()))?;

        let guard = self.execution_locks.try_acquire(intent.pool_id())?;

        let current = gas_price.clone()?;
        if current > self.limits.max_gas_price {
            return Err(ArbError::GasPriceExceeded {
                current,
                ceiling: self.limits.max_gas_price,
            });
        }

        let estimate = adapter.estimate_swap(intent.direction(), intent.input_amount())?;
        let slippage_bps = intent.max_slippage_bps().min(self.limits.max_slippage_bps);
        let min_output = estimate.min_output(slippage_bps);

        Ok((adapter, min_output, guard))
    }
}

/// Runs one swap while holding the pool's lock; the guard drops when this returns.
async fn execute_intent(
    adapter: Arc<dyn PoolAdapter>,
    intent: TradeIntent,
    min_output: u64,
    guard: OwnedMutexGuard<()>,
    metrics: Arc<OrchestratorMetrics>,
    coins: Arc<CoinRegistry>,
) -> ExecutionOutcome {
    let spec = adapter.spec();
    let (coin_in, coin_out) = intent.direction().coins(&spec.coin_a, &spec.coin_b);
    let amounts = trade_amounts(&coins, coin_in, coin_out, intent.input_amount(), min_output);
    info!(
        "⚡ [{}] {} {} on {} {}: {}",
        intent.strategy(),
        intent.direction(),
        intent.pool_id(),
        spec.venue,
        short_address(&spec.address),
        amounts
    );

    let result = adapter
        .execute_swap(intent.direction(), intent.input_amount(), min_output)
        .await;
    drop(guard);

    match &result {
        Ok(tx) => {
            info!(
                "✅ [{}] swap {} landed on {} (gas {})",
                intent.strategy(),
                tx.digest,
                short_address(&spec.address),
                tx.gas_used
            );
            metrics.record_execution(true, tx.gas_used);
        }
        Err(e) => {
            error!(
                "❌ [{}] {} swap on pool {} ({}) failed, {}: {}",
                intent.strategy(),
                intent.direction(),
                intent.pool_id(),
                short_address(&spec.address),
                amounts,
                e
            );
            metrics.record_execution(false, 0);
        }
    }

    ExecutionOutcome {
        intent,
        min_output,
        result,
    }
}

fn trade_amounts(
    coins: &CoinRegistry,
    coin_in: &str,
    coin_out: &str,
    input_amount: u64,
    min_output: u64,
) -> String {
    format!(
        "{} in, at least {} out",
        coins.format_amount(coin_in, input_amount),
        coins.format_amount(coin_out, min_output)
    )
}
