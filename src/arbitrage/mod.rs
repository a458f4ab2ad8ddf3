//! Strategy evaluation (cycle arbitrage, trend following, cross-pool spread)
//! and the scheduling loop that feeds and executes it.

pub mod cycle;
pub mod metrics;
pub mod orchestrator;
pub mod price_cache;
pub mod registry;
pub mod spread;
pub mod strategy;
pub mod trend;
pub mod types;

pub use cycle::{Arbitrage, CycleLeg};
pub use metrics::{MetricsSnapshot, OrchestratorMetrics};
pub use orchestrator::{ArbitrageOrchestrator, RiskLimits, TickReport};
pub use price_cache::PriceCache;
pub use registry::PoolRegistry;
pub use spread::MarketDifference;
pub use strategy::{MarketSnapshot, Strategy};
pub use trend::RideTheTrend;
pub use types::{DroppedIntent, ExecutionOutcome, StrategyContext, StrategyState, TradeIntent};
