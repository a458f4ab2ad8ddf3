// src/sui/coins.rs
use super::{CoinInfo, CoinMetadataResolver};
use crate::utils::to_ui_amount;
use log::{info, warn};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CoinEntry {
    pub symbol: String,
    pub coin_type: String,
    /// Nominal input amount (raw units) used when a strategy starts a trade in this coin.
    pub trade_size: u64,
    pub info: Option<CoinInfo>,
}

/// Coin table keyed by full coin type. Holds the default trade sizes and, once
/// hydrated, the on-chain metadata used to print readable amounts.
#[derive(Debug, Clone, Default)]
pub struct CoinRegistry {
    by_type: HashMap<String, CoinEntry>,
}

impl CoinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, coin_type: &str, trade_size: u64, decimals: Option<u8>) {
        let info = decimals.map(|decimals| CoinInfo {
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            decimals,
        });
        self.by_type.insert(
            coin_type.to_string(),
            CoinEntry {
                symbol: symbol.to_string(),
                coin_type: coin_type.to_string(),
                trade_size,
                info,
            },
        );
    }

    pub fn get(&self, coin_type: &str) -> Option<&CoinEntry> {
        self.by_type.get(coin_type)
    }

    pub fn trade_size(&self, coin_type: &str) -> Option<u64> {
        self.get(coin_type).map(|entry| entry.trade_size)
    }

    pub fn symbol<'a>(&'a self, coin_type: &'a str) -> &'a str {
        self.get(coin_type)
            .map(|entry| entry.symbol.as_str())
            .unwrap_or(coin_type)
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Fetches metadata for every coin the configuration did not give decimals for.
    /// Failures only cost readable logging, so they are logged and skipped.
    pub async fn hydrate(&mut self, resolver: &dyn CoinMetadataResolver) {
        for entry in self.by_type.values_mut().filter(|e| e.info.is_none()) {
            match resolver.coin_info(&entry.coin_type).await {
                Ok(info) => {
                    info!(
                        "🪙 {} resolved: {} ({} decimals)",
                        entry.symbol, info.name, info.decimals
                    );
                    entry.info = Some(info);
                }
                Err(e) => warn!("Could not resolve metadata for {}: {}", entry.coin_type, e),
            }
        }
    }

    /// `"2.000000 SUI"` when decimals are known, raw units otherwise.
    pub fn format_amount(&self, coin_type: &str, amount: u64) -> String {
        match self.get(coin_type) {
            Some(CoinEntry {
                symbol,
                info: Some(info),
                ..
            }) => format!("{:.6} {}", to_ui_amount(amount, info.decimals), symbol),
            Some(entry) => format!("{} {} (raw)", amount, entry.symbol),
            None => format!("{} {}", amount, coin_type),
        }
    }
}
