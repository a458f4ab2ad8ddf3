// src/sui/paper.rs
//! Paper trading: real reads, simulated submission.

use super::{
    KeypairRef, NetworkClient, NetworkError, RawPoolState, SignedTransaction, Signer,
    TransactionPayload, TxResult, TxStatus,
};
use crate::error::ArbError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Forwards pool and gas reads to the wrapped client and records submissions
/// instead of sending them.
pub struct PaperNetworkClient {
    inner: Arc<dyn NetworkClient>,
    simulated_gas: u64,
    submitted: AtomicU64,
}

impl PaperNetworkClient {
    pub fn new(inner: Arc<dyn NetworkClient>, simulated_gas: u64) -> Self {
        Self {
            inner,
            simulated_gas,
            submitted: AtomicU64::new(0),
        }
    }

    pub fn submitted_count(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NetworkClient for PaperNetworkClient {
    async fn fetch_pool_state(&self, address: &str) -> Result<RawPoolState, NetworkError> {
        self.inner.fetch_pool_state(address).await
    }

    async fn reference_gas_price(&self) -> Result<u64, NetworkError> {
        self.inner.reference_gas_price().await
    }

    async fn submit_transaction(&self, tx: SignedTransaction) -> Result<TxResult, NetworkError> {
        let n = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        let digest = format!("paper-{}", uuid::Uuid::new_v4());
        info!(
            "📄 Paper submission #{} ({} bytes payload) -> {}",
            n,
            tx.tx_bytes.len(),
            digest
        );
        Ok(TxResult {
            digest,
            status: TxStatus::Success,
            gas_used: self.simulated_gas,
        })
    }
}

/// Stand-in signer for paper mode: encodes the payload so the submission log
/// shows what would have been signed.
pub struct PaperSigner;

#[async_trait]
impl Signer for PaperSigner {
    async fn sign(
        &self,
        payload: &TransactionPayload,
        keypair: &KeypairRef,
    ) -> Result<SignedTransaction, ArbError> {
        let bytes = serde_json::to_vec(payload)?;
        Ok(SignedTransaction {
            tx_bytes: STANDARD.encode(bytes),
            signatures: vec![format!("paper:{}", keypair)],
        })
    }
}
