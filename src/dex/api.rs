// src/dex/api.rs
//! The venue-independent pool interface and the transaction plumbing shared by
//! every venue implementation.

use crate::dex::pool::{CurveKind, PoolId, PoolSpec, SwapDirection};
use crate::dex::quote::{PriceObservation, SwapEstimate, TransactionResult};
use crate::error::ArbError;
use crate::sui::{NetworkClient, Signer, TransactionPayload, TxStatus};
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::json;
use std::sync::Arc;

/// Uniform access to one liquidity pool on one venue.
///
/// `get_quote` refreshes the adapter's view of the pool; `estimate_swap` is a pure
/// computation over that last view; `execute_swap` is the only call with external
/// effects and is never retried by the adapter.
#[async_trait]
pub trait PoolAdapter: Send + Sync {
    fn spec(&self) -> &PoolSpec;

    fn curve(&self) -> CurveKind;

    /// Fetches pool state and derives the spot price of A in B.
    async fn get_quote(&self, pool_id: PoolId) -> Result<PriceObservation, ArbError>;

    /// Simulates a swap against the last fetched state, without touching the network.
    fn estimate_swap(
        &self,
        direction: SwapDirection,
        input_amount: u64,
    ) -> Result<SwapEstimate, ArbError>;

    /// Builds, signs and submits a swap guarded on-chain by `min_output`.
    async fn execute_swap(
        &self,
        direction: SwapDirection,
        input_amount: u64,
        min_output: u64,
    ) -> Result<TransactionResult, ArbError>;
}

/// What every adapter needs to reach the chain: its pool description, the node, the signer
/// holding its funding key, and the gas budget to attach to swaps.
pub struct PoolConnection {
    pub spec: PoolSpec,
    pub network: Arc<dyn NetworkClient>,
    pub signer: Arc<dyn Signer>,
    pub gas_budget: u64,
}

impl PoolConnection {
    pub fn new(
        spec: PoolSpec,
        network: Arc<dyn NetworkClient>,
        signer: Arc<dyn Signer>,
        gas_budget: u64,
    ) -> Self {
        Self {
            spec,
            network,
            signer,
            gas_budget,
        }
    }

    pub fn swap_payload(
        &self,
        direction: SwapDirection,
        input_amount: u64,
        min_output: u64,
    ) -> TransactionPayload {
        TransactionPayload {
            target: self.spec.swap_target(direction),
            type_arguments: vec![self.spec.coin_a.clone(), self.spec.coin_b.clone()],
            arguments: vec![
                json!(self.spec.address),
                json!(input_amount.to_string()),
                json!(min_output.to_string()),
            ],
            gas_budget: self.gas_budget,
        }
    }

    /// Sign and submit once. Every failure mode is reported as `SwapRejected`.
    pub async fn submit_swap(
        &self,
        direction: SwapDirection,
        input_amount: u64,
        min_output: u64,
    ) -> Result<TransactionResult, ArbError> {
        if input_amount == 0 {
            return Err(ArbError::SwapRejected(format!(
                "pool {}: refusing zero-amount swap",
                self.spec.address
            )));
        }

        let payload = self.swap_payload(direction, input_amount, min_output);
        debug!(
            "Submitting {} on {} ({} in, {} min out)",
            payload.target, self.spec.address, input_amount, min_output
        );

        let signed = self
            .signer
            .sign(&payload, &self.spec.keypair)
            .await
            .map_err(|e| {
                ArbError::SwapRejected(format!("pool {}: {}", self.spec.address, e))
            })?;

        let tx = self
            .network
            .submit_transaction(signed)
            .await
            .map_err(|e| ArbError::SwapRejected(format!("pool {}: {}", self.spec.address, e)))?;

        match tx.status {
            TxStatus::Success => Ok(TransactionResult {
                digest: tx.digest,
                input_amount,
                min_output,
                gas_used: tx.gas_used,
            }),
            TxStatus::Reverted(reason) => {
                warn!("Swap {} on {} reverted on-chain: {}", tx.digest, self.spec.address, reason);
                Err(ArbError::SwapRejected(format!(
                    "pool {}: transaction {} reverted: {}",
                    self.spec.address, tx.digest, reason
                )))
            }
        }
    }
}
