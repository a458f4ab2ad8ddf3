use crate::arbitrage::RiskLimits;
use crate::dex::CurveKind;
use crate::error::ArbError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkSettings,
    /// Trade-size table, keyed by symbol.
    #[serde(default)]
    pub coins: BTreeMap<String, CoinSettings>,
    #[serde(default)]
    pub pools: Vec<PoolSettings>,
    #[serde(default)]
    pub strategies: Vec<StrategySettings>,
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub rpc_url: String,
    /// Remote signing service. Required unless paper trading.
    #[serde(default)]
    pub signer_url: Option<String>,
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
    #[serde(default = "default_rpc_max_retries")]
    pub rpc_max_retries: usize,
    #[serde(default = "default_rpc_retry_delay_ms")]
    pub rpc_retry_delay_ms: u64,
    #[serde(default)]
    pub paper_trading: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinSettings {
    pub coin_type: String,
    /// Raw units sold when a strategy starts a trade in this coin.
    pub trade_size: u64,
    #[serde(default)]
    pub decimals: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    pub name: String,
    pub venue: String,
    pub curve: CurveKind,
    pub address: String,
    /// Symbols from the coin table.
    pub coin_a: String,
    pub coin_b: String,
    /// Name of the environment variable holding the signer key id for this pool.
    pub keypair: String,
    pub package: String,
    pub module: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegSettings {
    pub pool: String,
    pub a2b: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySettings {
    Arbitrage {
        label: String,
        threshold: f64,
        legs: Vec<LegSettings>,
        #[serde(default)]
        trade_size: Option<u64>,
    },
    RideTheTrend {
        label: String,
        pool: String,
        short_window: usize,
        long_window: usize,
        limit: f64,
    },
    /// Buy the base coin of one pair on whichever listed pool prices it lowest.
    MarketDifference {
        label: String,
        pools: Vec<String>,
        #[serde(default = "default_market_difference_limit")]
        limit: f64,
    },
}

impl StrategySettings {
    pub fn label(&self) -> &str {
        match self {
            StrategySettings::Arbitrage { label, .. } => label,
            StrategySettings::RideTheTrend { label, .. } => label,
            StrategySettings::MarketDifference { label, .. } => label,
        }
    }

    fn pool_refs(&self) -> Vec<&str> {
        match self {
            StrategySettings::Arbitrage { legs, .. } => legs.iter().map(|l| l.pool.as_str()).collect(),
            StrategySettings::RideTheTrend { pool, .. } => vec![pool.as_str()],
            StrategySettings::MarketDifference { pools, .. } => {
                pools.iter().map(String::as_str).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitSettings {
    /// Reference gas price ceiling, MIST per unit.
    #[serde(default = "default_max_gas_price")]
    pub max_gas_price: u64,
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,
    #[serde(default = "default_max_slippage_bps")]
    pub max_slippage_bps: u16,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_evaluation_delay_ms")]
    pub evaluation_delay_ms: u64,
    #[serde(default)]
    pub stale_after_ms: Option<u64>,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_gas_price: default_max_gas_price(),
            gas_budget: default_gas_budget(),
            max_slippage_bps: default_max_slippage_bps(),
            poll_interval_ms: default_poll_interval_ms(),
            evaluation_delay_ms: default_evaluation_delay_ms(),
            stale_after_ms: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_rpc_timeout_ms() -> u64 {
    5_000
}
fn default_rpc_max_retries() -> usize {
    3
}
fn default_rpc_retry_delay_ms() -> u64 {
    250
}
fn default_market_difference_limit() -> f64 {
    1.01
}
fn default_max_gas_price() -> u64 {
    1_000
}
fn default_gas_budget() -> u64 {
    50_000_000
}
fn default_max_slippage_bps() -> u16 {
    50
}
fn default_poll_interval_ms() -> u64 {
    1_000
}
fn default_evaluation_delay_ms() -> u64 {
    700
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArbError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ArbError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ArbError> {
        serde_json::from_str(raw)
            .map_err(|e| ArbError::ConfigError(format!("invalid configuration: {}", e)))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Overrides from any key lookup; unparsable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Some(url) = lookup("SIGNER_URL") {
            self.network.signer_url = Some(url);
        }
        if let Some(paper) = lookup("PAPER_TRADING").and_then(|v| v.parse().ok()) {
            self.network.paper_trading = paper;
        }
        if let Some(v) = lookup("MAX_GAS_PRICE").and_then(|v| v.parse().ok()) {
            self.limits.max_gas_price = v;
        }
        if let Some(v) = lookup("MAX_SLIPPAGE_BPS").and_then(|v| v.parse().ok()) {
            self.limits.max_slippage_bps = v;
        }
        if let Some(v) = lookup("POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.limits.poll_interval_ms = v;
        }
        if let Some(v) = lookup("EVALUATION_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.limits.evaluation_delay_ms = v;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ArbError> {
        Url::parse(&self.network.rpc_url)?;
        if let Some(signer) = &self.network.signer_url {
            Url::parse(signer)?;
        } else if !self.network.paper_trading {
            return Err(ArbError::ConfigError(
                "network.signer_url is required for live trading".to_string(),
            ));
        }

        let limits = &self.limits;
        if limits.poll_interval_ms == 0 {
            return Err(ArbError::ConfigError("poll_interval_ms must be positive".to_string()));
        }
        if limits.evaluation_delay_ms > limits.poll_interval_ms {
            return Err(ArbError::ConfigError(format!(
                "evaluation_delay_ms ({}) exceeds poll_interval_ms ({})",
                limits.evaluation_delay_ms, limits.poll_interval_ms
            )));
        }
        if limits.max_slippage_bps > 10_000 {
            return Err(ArbError::ConfigError(format!(
                "max_slippage_bps {} is above 100%",
                limits.max_slippage_bps
            )));
        }

        for (symbol, coin) in &self.coins {
            if coin.trade_size == 0 {
                return Err(ArbError::ConfigError(format!("coin {} has zero trade_size", symbol)));
            }
        }

        if let Some(name) = self.pools.iter().map(|p| p.name.as_str()).duplicates().next() {
            return Err(ArbError::ConfigError(format!("duplicate pool name {}", name)));
        }
        for pool in &self.pools {
            for symbol in [&pool.coin_a, &pool.coin_b] {
                if !self.coins.contains_key(symbol) {
                    return Err(ArbError::ConfigError(format!(
                        "pool {} uses coin {} which is not in the coin table",
                        pool.name, symbol
                    )));
                }
            }
        }

        if let Some(label) = self.strategies.iter().map(|s| s.label()).duplicates().next() {
            return Err(ArbError::ConfigError(format!("duplicate strategy label {}", label)));
        }
        for strategy in &self.strategies {
            if let Some(pool) = strategy.pool_refs().into_iter().duplicates().next() {
                return Err(ArbError::ConfigError(format!(
                    "strategy {} uses pool {} more than once",
                    strategy.label(),
                    pool
                )));
            }
            for pool in strategy.pool_refs() {
                if self.pool(pool).is_none() {
                    return Err(ArbError::ConfigError(format!(
                        "strategy {} references unknown pool {}",
                        strategy.label(),
                        pool
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn validate_and_log(&self) {
        log::info!(
            "Configuration loaded: rpc {}, {} mode, {} coin(s), {} pool(s), {} strategy(ies)",
            self.network.rpc_url,
            if self.network.paper_trading { "paper" } else { "live" },
            self.coins.len(),
            self.pools.len(),
            self.strategies.len()
        );
        log::info!("Limits: {:?}", self.limits);
        for pool in &self.pools {
            log::debug!(
                "Pool {}: {} {:?} {} ({}/{})",
                pool.name,
                pool.venue,
                pool.curve,
                pool.address,
                pool.coin_a,
                pool.coin_b
            );
        }
    }

    pub fn pool(&self, name: &str) -> Option<&PoolSettings> {
        self.pools.iter().find(|p| p.name == name)
    }

    pub fn risk_limits(&self) -> RiskLimits {
        RiskLimits {
            max_gas_price: self.limits.max_gas_price,
            max_slippage_bps: self.limits.max_slippage_bps,
            stale_after: self.limits.stale_after_ms.map(Duration::from_millis),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.limits.poll_interval_ms)
    }

    pub fn evaluation_delay(&self) -> Duration {
        Duration::from_millis(self.limits.evaluation_delay_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.network.rpc_timeout_ms)
    }
}
