//! In-memory stand-ins for the chain and for pool adapters.
//!
//! `MockNetworkClient` serves pool objects from a map and records submissions;
//! `MockPoolAdapter` skips the network entirely and quotes a fixed linear rate,
//! which is what strategy and scheduler tests want to control directly.

use crate::{
    dex::{
        api::PoolAdapter,
        pool::{CurveKind, PoolId, PoolSpec, SwapDirection},
        quote::{PriceObservation, SwapEstimate, TransactionResult},
    },
    error::ArbError,
    sui::{
        CoinInfo, CoinMetadataResolver, KeypairRef, NetworkClient, NetworkError, RawPoolState,
        SignedTransaction, Signer, TransactionPayload, TxResult, TxStatus,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Mutex,
    },
    time::Duration,
};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Scriptable [`NetworkClient`] + [`CoinMetadataResolver`].
pub struct MockNetworkClient {
    pools: Mutex<HashMap<String, serde_json::Map<String, serde_json::Value>>>,
    failing_pools: Mutex<HashSet<String>>,
    versions: AtomicU64,
    gas_price: AtomicU64,
    gas_unavailable: AtomicBool,
    revert_reason: Mutex<Option<String>>,
    submits: AtomicU64,
    gas_queries: AtomicU64,
    coin_info: Mutex<HashMap<String, CoinInfo>>,
    metadata_lookups: AtomicU64,
}

impl MockNetworkClient {
    pub fn new(gas_price: u64) -> Self {
        Self {
            pools: Mutex::new(HashMap::new()),
            failing_pools: Mutex::new(HashSet::new()),
            versions: AtomicU64::new(0),
            gas_price: AtomicU64::new(gas_price),
            gas_unavailable: AtomicBool::new(false),
            revert_reason: Mutex::new(None),
            submits: AtomicU64::new(0),
            gas_queries: AtomicU64::new(0),
            coin_info: Mutex::new(HashMap::new()),
            metadata_lookups: AtomicU64::new(0),
        }
    }

    /// Sets the content fields served for `address`. Non-object values clear them.
    pub fn set_pool_fields(&self, address: &str, fields: serde_json::Value) {
        let fields = match fields {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        lock(&self.pools).insert(address.to_string(), fields);
    }

    pub fn fail_pool(&self, address: &str, failing: bool) {
        let mut failing_pools = lock(&self.failing_pools);
        if failing {
            failing_pools.insert(address.to_string());
        } else {
            failing_pools.remove(address);
        }
    }

    pub fn set_gas_price(&self, price: u64) {
        self.gas_price.store(price, Ordering::SeqCst);
    }

    pub fn fail_gas_price(&self, failing: bool) {
        self.gas_unavailable.store(failing, Ordering::SeqCst);
    }

    /// Every following submission reverts with `reason` until [`Self::clear_reverts`].
    pub fn revert_next_submissions(&self, reason: &str) {
        *lock(&self.revert_reason) = Some(reason.to_string());
    }

    pub fn clear_reverts(&self) {
        *lock(&self.revert_reason) = None;
    }

    pub fn set_coin_info(&self, coin_type: &str, info: CoinInfo) {
        lock(&self.coin_info).insert(coin_type.to_string(), info);
    }

    pub fn submit_count(&self) -> u64 {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn gas_price_queries(&self) -> u64 {
        self.gas_queries.load(Ordering::SeqCst)
    }

    pub fn metadata_lookups(&self) -> u64 {
        self.metadata_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkClient for MockNetworkClient {
    async fn fetch_pool_state(&self, address: &str) -> Result<RawPoolState, NetworkError> {
        if lock(&self.failing_pools).contains(address) {
            return Err(NetworkError::Transport(format!("{} unreachable", address)));
        }
        let fields = lock(&self.pools)
            .get(address)
            .cloned()
            .ok_or_else(|| NetworkError::Rejected(format!("object {} does not exist", address)))?;
        Ok(RawPoolState {
            object_id: address.to_string(),
            version: self.versions.fetch_add(1, Ordering::SeqCst) + 1,
            fields,
        })
    }

    async fn reference_gas_price(&self) -> Result<u64, NetworkError> {
        self.gas_queries.fetch_add(1, Ordering::SeqCst);
        if self.gas_unavailable.load(Ordering::SeqCst) {
            return Err(NetworkError::Transport("gas price endpoint down".into()));
        }
        Ok(self.gas_price.load(Ordering::SeqCst))
    }

    async fn submit_transaction(&self, tx: SignedTransaction) -> Result<TxResult, NetworkError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        debug!("mock submit of {} bytes", tx.tx_bytes.len());
        let status = match lock(&self.revert_reason).clone() {
            Some(reason) => TxStatus::Reverted(reason),
            None => TxStatus::Success,
        };
        Ok(TxResult {
            digest: format!("mock-{}", Uuid::new_v4()),
            status,
            gas_used: 1_000_000,
        })
    }
}

#[async_trait]
impl CoinMetadataResolver for MockNetworkClient {
    async fn coin_info(&self, coin_type: &str) -> Result<CoinInfo, NetworkError> {
        self.metadata_lookups.fetch_add(1, Ordering::SeqCst);
        lock(&self.coin_info)
            .get(coin_type)
            .cloned()
            .ok_or_else(|| NetworkError::Rejected(format!("no metadata for {}", coin_type)))
    }
}

/// Signs anything unless told to fail.
#[derive(Default)]
pub struct MockSigner {
    failing: AtomicBool,
    signed: AtomicU64,
}

impl MockSigner {
    pub fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
            signed: AtomicU64::new(0),
        }
    }

    pub fn signed_count(&self) -> u64 {
        self.signed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Signer for MockSigner {
    async fn sign(
        &self,
        payload: &TransactionPayload,
        keypair: &KeypairRef,
    ) -> Result<SignedTransaction, ArbError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ArbError::SigningError(format!("key {} is locked", keypair)));
        }
        self.signed.fetch_add(1, Ordering::SeqCst);
        Ok(SignedTransaction {
            tx_bytes: payload.target.clone(),
            signatures: vec![format!("mock:{}", keypair)],
        })
    }
}

/// A pool adapter with no chain behind it.
///
/// Quotes return the configured rate; estimates are `input * rate` for A->B and
/// `input / rate` for B->A (floored), so cycle multipliers are exact products of
/// the configured rates.
pub struct MockPoolAdapter {
    spec: PoolSpec,
    rate: Mutex<f64>,
    quote_failure: AtomicBool,
    quote_delay: Mutex<Duration>,
    liquidity_failure: AtomicBool,
    execute_delay: Mutex<Duration>,
    execute_failure: Mutex<Option<String>>,
    quotes: AtomicU64,
    executions: AtomicU64,
    in_flight: AtomicU64,
    max_in_flight: AtomicU64,
}

impl MockPoolAdapter {
    pub fn new(venue: &str, coin_a: &str, coin_b: &str, rate: f64) -> Self {
        let address = format!("0x{}", Uuid::new_v4().simple());
        Self {
            spec: PoolSpec {
                venue: venue.to_string(),
                address,
                coin_a: coin_a.to_string(),
                coin_b: coin_b.to_string(),
                keypair: KeypairRef(format!("{}-key", venue)),
                package: "0x0".into(),
                module: "mock".into(),
            },
            rate: Mutex::new(rate),
            quote_failure: AtomicBool::new(false),
            quote_delay: Mutex::new(Duration::ZERO),
            liquidity_failure: AtomicBool::new(false),
            execute_delay: Mutex::new(Duration::ZERO),
            execute_failure: Mutex::new(None),
            quotes: AtomicU64::new(0),
            executions: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            max_in_flight: AtomicU64::new(0),
        }
    }

    pub fn set_rate(&self, rate: f64) {
        *lock(&self.rate) = rate;
    }

    pub fn fail_quotes(&self, failing: bool) {
        self.quote_failure.store(failing, Ordering::SeqCst);
    }

    pub fn set_quote_delay(&self, delay: Duration) {
        *lock(&self.quote_delay) = delay;
    }

    pub fn fail_liquidity(&self, failing: bool) {
        self.liquidity_failure.store(failing, Ordering::SeqCst);
    }

    pub fn set_execute_delay(&self, delay: Duration) {
        *lock(&self.execute_delay) = delay;
    }

    pub fn fail_executions(&self, reason: Option<&str>) {
        *lock(&self.execute_failure) = reason.map(str::to_string);
    }

    pub fn quote_count(&self) -> u64 {
        self.quotes.load(Ordering::SeqCst)
    }

    pub fn execute_count(&self) -> u64 {
        self.executions.load(Ordering::SeqCst)
    }

    /// Highest number of `execute_swap` calls observed running at once.
    pub fn max_concurrent_executions(&self) -> u64 {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolAdapter for MockPoolAdapter {
    fn spec(&self) -> &PoolSpec {
        &self.spec
    }

    fn curve(&self) -> CurveKind {
        CurveKind::ConstantProduct
    }

    async fn get_quote(&self, pool_id: PoolId) -> Result<PriceObservation, ArbError> {
        self.quotes.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.quote_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.quote_failure.load(Ordering::SeqCst) {
            return Err(ArbError::QuoteUnavailable(format!(
                "pool {} timed out",
                self.spec.address
            )));
        }
        let rate = *lock(&self.rate);
        PriceObservation::new(pool_id, &self.spec.coin_a, &self.spec.coin_b, rate, Utc::now())
    }

    fn estimate_swap(
        &self,
        direction: SwapDirection,
        input_amount: u64,
    ) -> Result<SwapEstimate, ArbError> {
        if self.liquidity_failure.load(Ordering::SeqCst) {
            return Err(ArbError::InsufficientLiquidity(format!(
                "pool {} drained",
                self.spec.address
            )));
        }
        let rate = *lock(&self.rate);
        let output = match direction {
            SwapDirection::AToB => input_amount as f64 * rate,
            SwapDirection::BToA => input_amount as f64 / rate,
        };
        let expected_output = output.floor() as u64;
        if expected_output == 0 {
            return Err(ArbError::InsufficientLiquidity(format!(
                "pool {} returns nothing for {}",
                self.spec.address, input_amount
            )));
        }
        Ok(SwapEstimate {
            expected_output,
            price_impact: 0.0,
        })
    }

    async fn execute_swap(
        &self,
        _direction: SwapDirection,
        input_amount: u64,
        min_output: u64,
    ) -> Result<TransactionResult, ArbError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *lock(&self.execute_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let failure = lock(&self.execute_failure).clone();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match failure {
            Some(reason) => Err(ArbError::SwapRejected(format!(
                "pool {}: {}",
                self.spec.address, reason
            ))),
            None => Ok(TransactionResult {
                digest: format!("mock-{}", Uuid::new_v4()),
                input_amount,
                min_output,
                gas_used: 1_000_000,
            }),
        }
    }
}
