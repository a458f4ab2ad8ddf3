// src/dex/concentrated.rs
//! Adapter for concentrated-liquidity pools laid out like Cetus CLMM objects:
//! `coin_a` / `coin_b` balances, `current_sqrt_price` (Q64.64), `liquidity`
//! and `fee_rate` (parts per million).

use crate::dex::api::{PoolAdapter, PoolConnection};
use crate::dex::math::clmm::{self, FEE_RATE_DENOMINATOR};
use crate::dex::pool::{CurveKind, PoolId, PoolSpec, SwapDirection};
use crate::dex::quote::{PriceObservation, SwapEstimate, TransactionResult};
use crate::error::ArbError;
use crate::sui::RawPoolState;
use crate::utils::{json_u128, json_u64};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClmmState {
    pub balance_a: u64,
    pub balance_b: u64,
    pub sqrt_price_x64: u128,
    pub liquidity: u128,
    pub fee_rate_ppm: u64,
    pub version: u64,
}

impl ClmmState {
    pub fn from_raw(raw: &RawPoolState) -> Result<Self, ArbError> {
        let missing = |name: &str| {
            ArbError::QuoteUnavailable(format!(
                "pool {} is missing numeric field `{}`",
                raw.object_id, name
            ))
        };
        let u64_field = |name: &str| raw.field(name).and_then(json_u64).ok_or_else(|| missing(name));
        let u128_field =
            |name: &str| raw.field(name).and_then(json_u128).ok_or_else(|| missing(name));

        let state = Self {
            balance_a: u64_field("coin_a")?,
            balance_b: u64_field("coin_b")?,
            sqrt_price_x64: u128_field("current_sqrt_price")?,
            liquidity: u128_field("liquidity")?,
            fee_rate_ppm: u64_field("fee_rate")?,
            version: raw.version,
        };

        if state.sqrt_price_x64 == 0 || state.liquidity == 0 {
            return Err(ArbError::QuoteUnavailable(format!(
                "pool {} has no active liquidity (sqrt price {}, liquidity {})",
                raw.object_id, state.sqrt_price_x64, state.liquidity
            )));
        }
        if state.fee_rate_ppm >= FEE_RATE_DENOMINATOR {
            return Err(ArbError::QuoteUnavailable(format!(
                "pool {} reports fee rate {} ppm",
                raw.object_id, state.fee_rate_ppm
            )));
        }
        Ok(state)
    }
}

pub struct ConcentratedLiquidityPool {
    connection: PoolConnection,
    state: RwLock<Option<ClmmState>>,
}

impl ConcentratedLiquidityPool {
    pub fn new(connection: PoolConnection) -> Self {
        Self {
            connection,
            state: RwLock::new(None),
        }
    }

    pub fn last_state(&self) -> Option<ClmmState> {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PoolAdapter for ConcentratedLiquidityPool {
    fn spec(&self) -> &PoolSpec {
        &self.connection.spec
    }

    fn curve(&self) -> CurveKind {
        CurveKind::ConcentratedLiquidity
    }

    async fn get_quote(&self, pool_id: PoolId) -> Result<PriceObservation, ArbError> {
        let spec = &self.connection.spec;
        let raw = self
            .connection
            .network
            .fetch_pool_state(&spec.address)
            .await
            .map_err(|e| ArbError::QuoteUnavailable(format!("pool {}: {}", spec.address, e)))?;
        let state = ClmmState::from_raw(&raw)?;
        let price = clmm::sqrt_price_to_price(state.sqrt_price_x64).ok_or_else(|| {
            ArbError::QuoteUnavailable(format!("pool {} has zero sqrt price", spec.address))
        })?;
        let observation =
            PriceObservation::new(pool_id, &spec.coin_a, &spec.coin_b, price, Utc::now())?;

        debug!(
            "{} {} v{}: sqrt price {}, liquidity {} -> {:.9}",
            spec.venue, spec.address, state.version, state.sqrt_price_x64, state.liquidity, price
        );
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = Some(state);
        Ok(observation)
    }

    fn estimate_swap(
        &self,
        direction: SwapDirection,
        input_amount: u64,
    ) -> Result<SwapEstimate, ArbError> {
        let spec = &self.connection.spec;
        let state = self.last_state().ok_or_else(|| {
            ArbError::QuoteUnavailable(format!("pool {} has not been quoted yet", spec.address))
        })?;

        let swap = clmm::calculate_swap_output(
            input_amount,
            state.sqrt_price_x64,
            state.liquidity,
            state.fee_rate_ppm,
            direction.is_a2b(),
        )?;

        let available = match direction {
            SwapDirection::AToB => state.balance_b,
            SwapDirection::BToA => state.balance_a,
        };
        if swap.output_amount > available {
            return Err(ArbError::InsufficientLiquidity(format!(
                "pool {} holds {} of the output coin, {} requested",
                spec.address, available, swap.output_amount
            )));
        }

        Ok(SwapEstimate {
            expected_output: swap.output_amount,
            price_impact: swap.price_impact,
        })
    }

    async fn execute_swap(
        &self,
        direction: SwapDirection,
        input_amount: u64,
        min_output: u64,
    ) -> Result<TransactionResult, ArbError> {
        self.connection
            .submit_swap(direction, input_amount, min_output)
            .await
    }
}
