// src/dex/quote.rs

use crate::dex::pool::PoolId;
use crate::error::ArbError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spot price read from one pool at one instant. Never mutated; a newer
/// observation for the same pool supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub pool_id: PoolId,
    pub coin_a: String,
    pub coin_b: String,
    /// Price of one raw unit of A, in raw units of B.
    pub price_a_to_b: f64,
    pub timestamp: DateTime<Utc>,
}

impl PriceObservation {
    pub fn new(
        pool_id: PoolId,
        coin_a: &str,
        coin_b: &str,
        price_a_to_b: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ArbError> {
        if !price_a_to_b.is_finite() || price_a_to_b <= 0.0 {
            return Err(ArbError::QuoteUnavailable(format!(
                "pool {} produced non-positive price {}",
                pool_id, price_a_to_b
            )));
        }
        Ok(Self {
            pool_id,
            coin_a: coin_a.to_string(),
            coin_b: coin_b.to_string(),
            price_a_to_b,
            timestamp,
        })
    }

    pub fn price_b_to_a(&self) -> f64 {
        1.0 / self.price_a_to_b
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.timestamp
    }
}

/// Result of simulating a swap against the last fetched pool state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapEstimate {
    pub expected_output: u64,
    /// 0.0 = executes at spot, 1.0 = the pool is drained.
    pub price_impact: f64,
}

impl SwapEstimate {
    /// Lowest output still accepted after `slippage_bps` of adverse movement.
    pub fn min_output(&self, slippage_bps: u16) -> u64 {
        let keep = 10_000u128.saturating_sub(slippage_bps.min(10_000) as u128);
        ((self.expected_output as u128 * keep) / 10_000) as u64
    }
}

#[derive(Debug, Clone)]
pub struct TransactionResult {
    pub digest: String,
    pub input_amount: u64,
    pub min_output: u64,
    pub gas_used: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observations_require_positive_finite_prices() {
        let now = Utc::now();
        let id = PoolId::new();
        assert!(PriceObservation::new(id, "A", "B", 1.25, now).is_ok());
        assert!(PriceObservation::new(id, "A", "B", 0.0, now).is_err());
        assert!(PriceObservation::new(id, "A", "B", -3.0, now).is_err());
        assert!(PriceObservation::new(id, "A", "B", f64::NAN, now).is_err());
        assert!(PriceObservation::new(id, "A", "B", f64::INFINITY, now).is_err());
    }

    #[test]
    fn min_output_applies_slippage_guard() {
        let estimate = SwapEstimate {
            expected_output: 1_000_000,
            price_impact: 0.001,
        };
        assert_eq!(estimate.min_output(0), 1_000_000);
        assert_eq!(estimate.min_output(50), 995_000);
        assert_eq!(estimate.min_output(500), 950_000);
        assert_eq!(estimate.min_output(20_000), 0);
    }
}
