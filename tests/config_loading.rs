use std::path::PathBuf;
use std::sync::Arc;

use sui_arb_bot::bootstrap::{build_coin_registry, build_orchestrator_with, Clients};
use sui_arb_bot::config::{load_config, Config};
use sui_arb_bot::error::ArbError;
use sui_arb_bot::testing::{MockNetworkClient, MockSigner};

const CONFIG: &str = r#"{
    "network": { "rpc_url": "https://fullnode.testnet.sui.io:443", "paper_trading": true },
    "coins": {
        "SUI": { "coin_type": "0x2::sui::SUI", "trade_size": 500000000, "decimals": 9 },
        "USDC": { "coin_type": "0xa1ec::usdc::USDC", "trade_size": 500000, "decimals": 6 }
    },
    "pools": [
        { "name": "ramm", "venue": "ramm", "curve": "constant_product", "address": "0x11",
          "coin_a": "SUI", "coin_b": "USDC", "keypair": "RAMM_SIGNER", "package": "0x4ee5", "module": "interface2" },
        { "name": "cetus", "venue": "cetus", "curve": "concentrated_liquidity", "address": "0x22",
          "coin_a": "USDC", "coin_b": "SUI", "keypair": "CETUS_SIGNER", "package": "0x1eab", "module": "pool_script" }
    ],
    "strategies": [
        { "kind": "arbitrage", "label": "loop", "threshold": 1.0005,
          "legs": [ { "pool": "ramm", "a2b": true }, { "pool": "cetus", "a2b": true } ] },
        { "kind": "ride_the_trend", "label": "trend", "pool": "cetus",
          "short_window": 3, "long_window": 12, "limit": 1.002 }
    ],
    "limits": { "max_gas_price": 1000, "poll_interval_ms": 1000, "evaluation_delay_ms": 800 },
    "log_level": "debug"
}"#;

fn write_temp(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sui-arb-bot-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_file_and_builds_paper_orchestrator() {
    let path = write_temp(CONFIG);
    let config = load_config(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.pools.len(), 2);
    assert_eq!(config.strategies.len(), 2);

    let network = Arc::new(MockNetworkClient::new(750));
    let clients = Clients {
        network: network.clone(),
        signer: Arc::new(MockSigner::default()),
        metadata: network,
    };
    let coins = Arc::new(build_coin_registry(&config));
    let (orchestrator, ids) = build_orchestrator_with(&config, &clients, coins, |_| None).unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(orchestrator.strategy_states().len(), 2);
    assert_eq!(orchestrator.limits().max_gas_price, config.limits.max_gas_price);
}

#[test]
fn missing_file_is_a_config_error() {
    let result = load_config("/definitely/not/here/bot_config.json");
    assert!(matches!(result, Err(ArbError::ConfigError(_))));
}

#[test]
fn invalid_strategy_reference_fails_validation() {
    let broken = CONFIG.replace(r#""pool": "cetus", "a2b""#, r#""pool": "nowhere", "a2b""#);
    let config = Config::from_json(&broken).unwrap();
    let err = config.validate().unwrap_err();
    assert!(!err.is_recoverable());
    assert!(err.to_string().contains("nowhere"));
}
