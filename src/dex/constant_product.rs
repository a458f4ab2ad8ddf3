// src/dex/constant_product.rs
//! Adapter for constant-product pools. The pool object is expected to expose
//! `reserve_a`, `reserve_b` and `fee_bps` content fields.

use crate::dex::api::{PoolAdapter, PoolConnection};
use crate::dex::math::constant_product::{self, BPS_DENOMINATOR};
use crate::dex::pool::{CurveKind, PoolId, PoolSpec, SwapDirection};
use crate::dex::quote::{PriceObservation, SwapEstimate, TransactionResult};
use crate::error::ArbError;
use crate::sui::RawPoolState;
use crate::utils::json_u64;
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantProductState {
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub fee_bps: u64,
    pub version: u64,
}

impl ConstantProductState {
    pub fn from_raw(raw: &RawPoolState) -> Result<Self, ArbError> {
        let field = |name: &str| {
            raw.field(name).and_then(json_u64).ok_or_else(|| {
                ArbError::QuoteUnavailable(format!(
                    "pool {} is missing numeric field `{}`",
                    raw.object_id, name
                ))
            })
        };
        let state = Self {
            reserve_a: field("reserve_a")?,
            reserve_b: field("reserve_b")?,
            fee_bps: field("fee_bps")?,
            version: raw.version,
        };
        if state.reserve_a == 0 || state.reserve_b == 0 {
            return Err(ArbError::QuoteUnavailable(format!(
                "pool {} has zero reserves ({} / {})",
                raw.object_id, state.reserve_a, state.reserve_b
            )));
        }
        if state.fee_bps >= BPS_DENOMINATOR {
            return Err(ArbError::QuoteUnavailable(format!(
                "pool {} reports fee of {} bps",
                raw.object_id, state.fee_bps
            )));
        }
        Ok(state)
    }
}

pub struct ConstantProductPool {
    connection: PoolConnection,
    state: RwLock<Option<ConstantProductState>>,
}

impl ConstantProductPool {
    pub fn new(connection: PoolConnection) -> Self {
        Self {
            connection,
            state: RwLock::new(None),
        }
    }

    pub fn last_state(&self) -> Option<ConstantProductState> {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PoolAdapter for ConstantProductPool {
    fn spec(&self) -> &PoolSpec {
        &self.connection.spec
    }

    fn curve(&self) -> CurveKind {
        CurveKind::ConstantProduct
    }

    async fn get_quote(&self, pool_id: PoolId) -> Result<PriceObservation, ArbError> {
        let spec = &self.connection.spec;
        let raw = self
            .connection
            .network
            .fetch_pool_state(&spec.address)
            .await
            .map_err(|e| ArbError::QuoteUnavailable(format!("pool {}: {}", spec.address, e)))?;
        let state = ConstantProductState::from_raw(&raw)?;
        let price = constant_product::spot_price(state.reserve_a, state.reserve_b).ok_or_else(
            || ArbError::QuoteUnavailable(format!("pool {} has no liquidity", spec.address)),
        )?;
        let observation =
            PriceObservation::new(pool_id, &spec.coin_a, &spec.coin_b, price, Utc::now())?;

        debug!(
            "{} {} v{}: reserves {}/{} -> {:.9}",
            spec.venue, spec.address, state.version, state.reserve_a, state.reserve_b, price
        );
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = Some(state);
        Ok(observation)
    }

    fn estimate_swap(
        &self,
        direction: SwapDirection,
        input_amount: u64,
    ) -> Result<SwapEstimate, ArbError> {
        let state = self.last_state().ok_or_else(|| {
            ArbError::QuoteUnavailable(format!(
                "pool {} has not been quoted yet",
                self.connection.spec.address
            ))
        })?;
        let (reserve_in, reserve_out) = match direction {
            SwapDirection::AToB => (state.reserve_a, state.reserve_b),
            SwapDirection::BToA => (state.reserve_b, state.reserve_a),
        };
        let swap =
            constant_product::calculate_swap_output(input_amount, reserve_in, reserve_out, state.fee_bps)?;
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
