// src/sui/types.rs
//! Wire-level shapes exchanged with the RPC node and the signer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport-level failure talking to a node or signer. On-chain reverts are not
/// errors at this layer, they come back as [`TxStatus::Reverted`].
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        NetworkError::Transport(err.to_string())
    }
}

/// Content fields of a pool object as returned by `sui_getObject`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPoolState {
    pub object_id: String,
    pub version: u64,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl RawPoolState {
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}

/// Reference to the key a pool adapter trades with. The string is resolved by the
/// signer (a key id on a remote signing service), never a secret itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeypairRef(pub String);

impl std::fmt::Display for KeypairRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unsigned Move call describing one swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// `package::module::function`
    pub target: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<serde_json::Value>,
    pub gas_budget: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Base64 BCS transaction bytes.
    pub tx_bytes: String,
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Reverted(String),
}

#[derive(Debug, Clone)]
pub struct TxResult {
    pub digest: String,
    pub status: TxStatus,
    pub gas_used: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}
