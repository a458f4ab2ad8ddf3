// src/arbitrage/types.rs

use crate::dex::{PoolId, SwapDirection, TransactionResult};
use crate::error::ArbError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single swap a strategy wants executed. Consumed exactly once by dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeIntent {
    pool_id: PoolId,
    direction: SwapDirection,
    input_amount: u64,
    max_slippage_bps: u16,
    strategy: String,
}

impl TradeIntent {
    pub fn new(
        pool_id: PoolId,
        direction: SwapDirection,
        input_amount: u64,
        max_slippage_bps: u16,
        strategy: &str,
    ) -> Result<Self, ArbError> {
        if input_amount == 0 {
            return Err(ArbError::InvalidAmount(format!(
                "{}: trade intent on pool {} with zero input",
                strategy, pool_id
            )));
        }
        Ok(Self {
            pool_id,
            direction,
            input_amount,
            max_slippage_bps,
            strategy: strategy.to_string(),
        })
    }

    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    pub fn input_amount(&self) -> u64 {
        self.input_amount
    }

    pub fn max_slippage_bps(&self) -> u16 {
        self.max_slippage_bps
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrategyState {
    Idle,
    Evaluating,
    TradeEmitted,
}

/// Bookkeeping every strategy carries: what it listens to and where its
/// evaluation state machine stands. Never shared between strategies.
#[derive(Debug, Clone)]
pub struct StrategyContext {
    pub subscriptions: Vec<PoolId>,
    pub state: StrategyState,
    pub last_trade_at: Option<DateTime<Utc>>,
    pub evaluations: u64,
    pub emissions: u64,
}

impl StrategyContext {
    pub fn new(subscriptions: Vec<PoolId>) -> Self {
        Self {
            subscriptions,
            state: StrategyState::Idle,
            last_trade_at: None,
            evaluations: 0,
            emissions: 0,
        }
    }

    pub fn begin_evaluation(&mut self) {
        self.state = StrategyState::Evaluating;
        self.evaluations += 1;
    }

    /// Closes the evaluation; any emitted intent moves the machine to `TradeEmitted`.
    pub fn finish(&mut self, intents: Vec<TradeIntent>, now: DateTime<Utc>) -> Vec<TradeIntent> {
        if intents.is_empty() {
            self.state = StrategyState::Idle;
        } else {
            self.state = StrategyState::TradeEmitted;
            self.last_trade_at = Some(now);
            self.emissions += 1;
        }
        intents
    }
}

/// Result of one dispatched intent, returned by the spawned execution task.
#[derive(Debug)]
pub struct ExecutionOutcome {
    pub intent: TradeIntent,
    pub min_output: u64,
    pub result: Result<TransactionResult, ArbError>,
}

/// An intent that never reached `execute_swap`, with the reason.
#[derive(Debug, Clone)]
pub struct DroppedIntent {
    pub intent: TradeIntent,
    pub reason: ArbError,
}
