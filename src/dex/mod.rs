// src/dex/mod.rs

pub mod api;
pub mod concentrated;
pub mod constant_product;
pub mod math;
pub mod pool;
pub mod quote;

pub use api::{PoolAdapter, PoolConnection};
pub use concentrated::ConcentratedLiquidityPool;
pub use constant_product::ConstantProductPool;
pub use pool::{CurveKind, PoolId, PoolSpec, SwapDirection};
pub use quote::{PriceObservation, SwapEstimate, TransactionResult};

use std::sync::Arc;

/// Builds the adapter for a pool's curve family.
pub fn build_adapter(curve: CurveKind, connection: PoolConnection) -> Arc<dyn PoolAdapter> {
    match curve {
        CurveKind::ConstantProduct => Arc::new(ConstantProductPool::new(connection)),
        CurveKind::ConcentratedLiquidity => Arc::new(ConcentratedLiquidityPool::new(connection)),
    }
}
