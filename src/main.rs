// src/main.rs
use anyhow::Context;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use sui_arb_bot::{
    bootstrap::{build_clients, build_coin_registry, build_orchestrator},
    config::{config_path, load_config},
    utils::setup_logging,
};

#[derive(Parser, Debug)]
#[command(name = "sui-arb-bot", about = "Cross-pool arbitrage bot for Sui DEXes")]
struct Args {
    /// Path to the JSON configuration (falls back to BOT_CONFIG_PATH, then bot_config.json)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let path = config_path(args.config.as_deref());

    let config = load_config(&path).with_context(|| format!("loading {}", path))?;
    setup_logging(&config.log_level, config.log_file.as_deref()).context("initializing logging")?;
    info!("🚀 Sui arbitrage bot starting ({})", path);
    config.validate_and_log();

    let clients = build_clients(&config)?;

    let mut coins = build_coin_registry(&config);
    coins.hydrate(clients.metadata.as_ref()).await;
    let coins = Arc::new(coins);

    let (orchestrator, pool_ids) = build_orchestrator(&config, &clients, coins)?;
    for (name, id) in &pool_ids {
        info!("   🏊 {} -> {}", name, id);
    }

    let handle = tokio::spawn(orchestrator.run_until(
        config.poll_interval(),
        config.evaluation_delay(),
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        },
    ));
    handle.await.context("orchestrator task panicked")?;

    info!("👋 Shut down cleanly");
    Ok(())
}
