pub mod arbitrage;
pub mod bootstrap;
pub mod config;
pub mod dex;
pub mod error;
pub mod sui;
pub mod testing; // Mock chain and pool adapters
pub mod utils;

pub use arbitrage::{ArbitrageOrchestrator, RiskLimits, Strategy, TickReport, TradeIntent};
pub use dex::{PoolAdapter, PoolId, PriceObservation, SwapDirection};
pub use error::ArbError;
