// src/sui/mod.rs
//! Narrow interfaces to the chain: the RPC node, the signer and coin metadata.
//! Pool adapters and the orchestrator only ever talk to these traits.

pub mod coins;
pub mod paper;
pub mod rpc;
pub mod signer;
pub mod types;

use async_trait::async_trait;

use crate::error::ArbError;

pub use coins::CoinRegistry;
pub use paper::{PaperNetworkClient, PaperSigner};
pub use rpc::SuiRpcClient;
pub use signer::RemoteSigner;
pub use types::{
    CoinInfo, KeypairRef, NetworkError, RawPoolState, SignedTransaction, TransactionPayload,
    TxResult, TxStatus,
};

#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Reads the current content of a pool object.
    async fn fetch_pool_state(&self, address: &str) -> Result<RawPoolState, NetworkError>;

    /// Current reference gas price, in MIST per gas unit.
    async fn reference_gas_price(&self) -> Result<u64, NetworkError>;

    /// Submits a signed transaction and waits for its effects.
    async fn submit_transaction(&self, tx: SignedTransaction) -> Result<TxResult, NetworkError>;
}

#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(
        &self,
        payload: &TransactionPayload,
        keypair: &KeypairRef,
    ) -> Result<SignedTransaction, ArbError>;
}

#[async_trait]
pub trait CoinMetadataResolver: Send + Sync {
    async fn coin_info(&self, coin_type: &str) -> Result<CoinInfo, NetworkError>;
}
