// src/sui/rpc.rs
use super::{
    CoinInfo, CoinMetadataResolver, NetworkClient, NetworkError, RawPoolState, SignedTransaction,
    TxResult, TxStatus,
};
use crate::utils::json_u64;
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// JSON-RPC client for a Sui full node. Read calls are retried with a fixed delay;
/// transaction submission is attempted exactly once.
pub struct SuiRpcClient {
    http: reqwest::Client,
    endpoint: String,
    max_retries: usize,
    retry_delay: Duration,
    request_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(
        endpoint: &str,
        timeout: Duration,
        max_retries: usize,
        retry_delay: Duration,
    ) -> Result<Self, NetworkError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            max_retries: max_retries.max(1),
            retry_delay,
            request_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, NetworkError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response: Value = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(NetworkError::Rejected(format!("{}: {}", method, message)));
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| NetworkError::Rejected(format!("{}: response without result", method)))
    }

    async fn call_with_retry(&self, method: &str, params: Value) -> Result<Value, NetworkError> {
        let mut last_error = None;
        for attempt in 0..self.max_retries {
            match self.call(method, params.clone()).await {
                Ok(result) => {
                    debug!("[RPC - {}] succeeded on attempt {}", method, attempt + 1);
                    return Ok(result);
                }
                // The node answered; asking again will not change its mind.
                Err(e @ NetworkError::Rejected(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        "[RPC - {}] attempt {}/{} failed: {}",
                        method,
                        attempt + 1,
                        self.max_retries,
                        e
                    );
                    last_error = Some(e);
                    if attempt + 1 < self.max_retries {
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| NetworkError::Transport(format!("{}: no attempts made", method))))
    }
}

#[async_trait]
impl NetworkClient for SuiRpcClient {
    async fn fetch_pool_state(&self, address: &str) -> Result<RawPoolState, NetworkError> {
        let result = self
            .call_with_retry("sui_getObject", json!([address, { "showContent": true }]))
            .await?;
        parse_object_response(&result)
    }

    async fn reference_gas_price(&self) -> Result<u64, NetworkError> {
        let result = self
            .call_with_retry("suix_getReferenceGasPrice", json!([]))
            .await?;
        json_u64(&result).ok_or_else(|| {
            NetworkError::Rejected(format!("unexpected gas price payload: {}", result))
        })
    }

    async fn submit_transaction(&self, tx: SignedTransaction) -> Result<TxResult, NetworkError> {
        let result = self
            .call(
                "sui_executeTransactionBlock",
                json!([
                    tx.tx_bytes,
                    tx.signatures,
                    { "showEffects": true },
                    "WaitForLocalExecution"
                ]),
            )
            .await?;
        parse_execution_response(&result)
    }
}

#[async_trait]
impl CoinMetadataResolver for SuiRpcClient {
    async fn coin_info(&self, coin_type: &str) -> Result<CoinInfo, NetworkError> {
        let result = self
            .call_with_retry("suix_getCoinMetadata", json!([coin_type]))
            .await?;
        parse_coin_metadata(coin_type, &result)
    }
}

pub fn parse_object_response(result: &Value) -> Result<RawPoolState, NetworkError> {
    if let Some(err) = result.get("error") {
        return Err(NetworkError::Rejected(format!("object lookup failed: {}", err)));
    }
    let data = result
        .get("data")
        .ok_or_else(|| NetworkError::Rejected("object response without data".to_string()))?;
    let object_id = data
        .get("objectId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let version = data.get("version").and_then(json_u64).unwrap_or(0);
    let fields = data
        .get("content")
        .and_then(|c| c.get("fields"))
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| {
            NetworkError::Rejected(format!("object {} has no Move content fields", object_id))
        })?;

    Ok(RawPoolState {
        object_id,
        version,
        fields,
    })
}

pub fn parse_execution_response(result: &Value) -> Result<TxResult, NetworkError> {
    let digest = result
        .get("digest")
        .and_then(Value::as_str)
        .ok_or_else(|| NetworkError::Rejected("execution response without digest".to_string()))?
        .to_string();

    let effects = result.get("effects");
    let status = match effects
        .and_then(|e| e.get("status"))
        .and_then(|s| s.get("status"))
        .and_then(Value::as_str)
    {
        Some("success") => TxStatus::Success,
        Some(_) => TxStatus::Reverted(
            effects
                .and_then(|e| e.get("status"))
                .and_then(|s| s.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("transaction failed")
                .to_string(),
        ),
        None => TxStatus::Reverted("effects missing from execution response".to_string()),
    };

    let gas_used = effects
        .and_then(|e| e.get("gasUsed"))
        .map(|g| {
            let field = |name: &str| g.get(name).and_then(json_u64).unwrap_or(0);
            (field("computationCost") + field("storageCost"))
                .saturating_sub(field("storageRebate"))
        })
        .unwrap_or(0);

    Ok(TxResult {
        digest,
        status,
        gas_used,
    })
}

pub fn parse_coin_metadata(coin_type: &str, result: &Value) -> Result<CoinInfo, NetworkError> {
    if result.is_null() {
        return Err(NetworkError::Rejected(format!("no metadata for {}", coin_type)));
    }
    let decimals = result
        .get("decimals")
        .and_then(json_u64)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| NetworkError::Rejected(format!("bad decimals for {}", coin_type)))?;
    let text = |name: &str| {
        result
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Ok(CoinInfo {
        name: text("name"),
        symbol: text("symbol"),
        decimals,
    })
}
