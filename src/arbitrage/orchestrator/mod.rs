//! Arbitrage Orchestrator Module
//!
//! Split by concern:
//! - `core`: struct, registration, tick loop
//! - `detection_engine`: pool polling and strategy evaluation
//! - `execution_manager`: intent dispatch
//! - `concurrency_manager`: per-pool execution locks

pub mod concurrency_manager;
pub mod core;
pub mod detection_engine;
pub mod execution_manager;

pub use self::core::{ArbitrageOrchestrator, RiskLimits, TickReport};
pub use concurrency_manager::ExecutionLocks;
pub use detection_engine::PollSummary;
pub use execution_manager::DispatchSummary;
