//! Turns a validated [`Config`] into live (or paper) clients and a ready-to-run
//! orchestrator.

use crate::{
    arbitrage::{
        Arbitrage, ArbitrageOrchestrator, CycleLeg, MarketDifference, RideTheTrend, Strategy,
    },
    config::{Config, PoolSettings, StrategySettings},
    dex::{build_adapter, PoolConnection, PoolId, PoolSpec, SwapDirection},
    error::ArbError,
    sui::{
        CoinMetadataResolver, CoinRegistry, KeypairRef, NetworkClient, PaperNetworkClient,
        PaperSigner, RemoteSigner, Signer, SuiRpcClient,
    },
};
use log::{info, warn};
use std::{collections::HashMap, env, sync::Arc, time::Duration};

pub struct Clients {
    pub network: Arc<dyn NetworkClient>,
    pub signer: Arc<dyn Signer>,
    pub metadata: Arc<dyn CoinMetadataResolver>,
}

pub fn build_clients(config: &Config) -> Result<Clients, ArbError> {
    let rpc = Arc::new(
        SuiRpcClient::new(
            &config.network.rpc_url,
            config.rpc_timeout(),
            config.network.rpc_max_retries,
            Duration::from_millis(config.network.rpc_retry_delay_ms),
        )
        .map_err(|e| ArbError::ConfigError(format!("cannot build RPC client: {}", e)))?,
    );

    if config.network.paper_trading {
        info!("📝 Paper trading: swaps are signed and submitted in simulation only");
        return Ok(Clients {
            network: Arc::new(PaperNetworkClient::new(rpc.clone(), config.limits.gas_budget)),
            signer: Arc::new(PaperSigner),
            metadata: rpc,
        });
    }

    let signer_url = config.network.signer_url.as_deref().ok_or_else(|| {
        ArbError::ConfigError("network.signer_url is required for live trading".to_string())
    })?;
    Ok(Clients {
        network: rpc.clone(),
        signer: Arc::new(RemoteSigner::new(signer_url, config.rpc_timeout())?),
        metadata: rpc,
    })
}

pub fn build_coin_registry(config: &Config) -> CoinRegistry {
    let mut coins = CoinRegistry::new();
    for (symbol, coin) in &config.coins {
        coins.insert(symbol, &coin.coin_type, coin.trade_size, coin.decimals);
    }
    coins
}

/// The pool's keypair field names an environment variable holding the signer key id.
/// Live trading refuses to start without it; paper trading falls back to the name.
fn resolve_keypair<F>(pool: &PoolSettings, paper: bool, lookup: &F) -> Result<KeypairRef, ArbError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(&pool.keypair) {
        Some(key_id) if !key_id.is_empty() => Ok(KeypairRef(key_id)),
        _ if paper => Ok(KeypairRef(pool.keypair.clone())),
        _ => Err(ArbError::ConfigError(format!(
            "pool {}: environment variable {} is not set",
            pool.name, pool.keypair
        ))),
    }
}

fn coin_type<'a>(config: &'a Config, symbol: &str) -> Result<&'a str, ArbError> {
    config
        .coins
        .get(symbol)
        .map(|c| c.coin_type.as_str())
        .ok_or_else(|| ArbError::ConfigError(format!("unknown coin {}", symbol)))
}

pub fn build_orchestrator(
    config: &Config,
    clients: &Clients,
    coins: Arc<CoinRegistry>,
) -> Result<(ArbitrageOrchestrator, HashMap<String, PoolId>), ArbError> {
    build_orchestrator_with(config, clients, coins, |key| env::var(key).ok())
}

/// Same as [`build_orchestrator`] with an explicit lookup for keypair variables.
pub fn build_orchestrator_with<F>(
    config: &Config,
    clients: &Clients,
    coins: Arc<CoinRegistry>,
    lookup: F,
) -> Result<(ArbitrageOrchestrator, HashMap<String, PoolId>), ArbError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut orchestrator =
        ArbitrageOrchestrator::new(config.risk_limits(), clients.network.clone(), coins);
    let mut pool_ids = HashMap::new();

    for pool in &config.pools {
        let spec = PoolSpec {
            venue: pool.venue.clone(),
            address: pool.address.clone(),
            coin_a: coin_type(config, &pool.coin_a)?.to_string(),
            coin_b: coin_type(config, &pool.coin_b)?.to_string(),
            keypair: resolve_keypair(pool, config.network.paper_trading, &lookup)?,
            package: pool.package.clone(),
            module: pool.module.clone(),
        };
        let connection = PoolConnection::new(
            spec,
            clients.network.clone(),
            clients.signer.clone(),
            config.limits.gas_budget,
        );
        let pool_id = orchestrator.add_pool(build_adapter(pool.curve, connection));
        if pool_ids.insert(pool.name.clone(), pool_id).is_some() {
            warn!("Pool name {} registered twice; strategies use the last one", pool.name);
        }
    }

    let find = |name: &str| {
        pool_ids
            .get(name)
            .copied()
            .ok_or_else(|| ArbError::ConfigError(format!("unknown pool {}", name)))
    };
    let slippage = config.limits.max_slippage_bps;

    for settings in &config.strategies {
        let strategy: Box<dyn Strategy> = match settings {
            StrategySettings::Arbitrage {
                label,
                threshold,
                legs,
                trade_size,
            } => {
                let legs = legs
                    .iter()
                    .map(|leg| Ok(CycleLeg::new(find(&leg.pool)?, SwapDirection::from_a2b(leg.a2b))))
                    .collect::<Result<Vec<_>, ArbError>>()?;
                let mut arbitrage = Arbitrage::new(label, legs, *threshold, slippage)?;
                if let Some(amount) = trade_size {
                    arbitrage = arbitrage.with_trade_size(*amount);
                }
                Box::new(arbitrage)
            }
            StrategySettings::RideTheTrend {
                label,
                pool,
                short_window,
                long_window,
                limit,
            } => Box::new(RideTheTrend::new(
                label,
                find(pool)?,
                *short_window,
                *long_window,
                *limit,
                slippage,
            )?),
            StrategySettings::MarketDifference {
                label,
                pools,
                limit,
            } => {
                let pools = pools
                    .iter()
                    .map(|name| find(name))
                    .collect::<Result<Vec<_>, ArbError>>()?;
                Box::new(MarketDifference::new(label, pools, *limit, slippage)?)
            }
        };
        orchestrator.add_strategy(strategy)?;
    }

    Ok((orchestrator, pool_ids))
}
