// src/sui/signer.rs
use super::{KeypairRef, SignedTransaction, Signer, TransactionPayload};
use crate::error::ArbError;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delegates transaction building and signing to an external signing service.
/// The service owns the keys; this process only knows the key ids.
pub struct RemoteSigner {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct SignRequest<'a> {
    key_id: &'a str,
    payload: &'a TransactionPayload,
}

#[derive(Deserialize)]
struct SignResponse {
    tx_bytes: String,
    signatures: Vec<String>,
}

impl RemoteSigner {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ArbError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Signer for RemoteSigner {
    async fn sign(
        &self,
        payload: &TransactionPayload,
        keypair: &KeypairRef,
    ) -> Result<SignedTransaction, ArbError> {
        debug!("Requesting signature for {} with key {}", payload.target, keypair);
        let response = self
            .http
            .post(format!("{}/sign", self.endpoint))
            .json(&SignRequest {
                key_id: &keypair.0,
                payload,
            })
            .send()
            .await
            .map_err(|e| ArbError::SigningError(format!("signer unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArbError::SigningError(format!(
                "signer refused key {}: HTTP {}",
                keypair,
                response.status()
            )));
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| ArbError::SigningError(format!("malformed signer response: {}", e)))?;
        if signed.signatures.is_empty() {
            return Err(ArbError::SigningError(format!(
                "signer returned no signatures for key {}",
                keypair
            )));
        }

        Ok(SignedTransaction {
            tx_bytes: signed.tx_bytes,
            signatures: signed.signatures,
        })
    }
}
