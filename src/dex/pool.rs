// src/dex/pool.rs
use crate::sui::KeypairRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier handed out when a pool is registered with the orchestrator.
/// Two registrations of the same on-chain address get two different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(Uuid);

impl PoolId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Sell coin A, receive coin B.
    AToB,
    /// Sell coin B, receive coin A.
    BToA,
}

impl SwapDirection {
    pub fn from_a2b(a2b: bool) -> Self {
        if a2b {
            SwapDirection::AToB
        } else {
            SwapDirection::BToA
        }
    }

    pub fn is_a2b(self) -> bool {
        matches!(self, SwapDirection::AToB)
    }

    /// (input coin, output coin) for a pool with the given ordered pair.
    pub fn coins<'a>(self, coin_a: &'a str, coin_b: &'a str) -> (&'a str, &'a str) {
        match self {
            SwapDirection::AToB => (coin_a, coin_b),
            SwapDirection::BToA => (coin_b, coin_a),
        }
    }
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::AToB => write!(f, "A->B"),
            SwapDirection::BToA => write!(f, "B->A"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    ConstantProduct,
    ConcentratedLiquidity,
}

/// Static description of one pool, as configured.
#[derive(Debug, Clone)]
pub struct PoolSpec {
    /// Venue label, e.g. "cetus" or "ramm".
    pub venue: String,
    pub address: String,
    pub coin_a: String,
    pub coin_b: String,
    pub keypair: KeypairRef,
    /// Move package and module exposing `swap_a2b` / `swap_b2a`.
    pub package: String,
    pub module: String,
}

impl PoolSpec {
    pub fn swap_target(&self, direction: SwapDirection) -> String {
        let function = match direction {
            SwapDirection::AToB => "swap_a2b",
            SwapDirection::BToA => "swap_b2a",
        };
        format!("{}::{}::{}", self.package, self.module, function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_ids_are_unique_per_registration() {
        assert_ne!(PoolId::new(), PoolId::new());
    }

    #[test]
    fn direction_selects_input_and_output_coin() {
        assert_eq!(SwapDirection::AToB.coins("SUI", "USDC"), ("SUI", "USDC"));
        assert_eq!(SwapDirection::BToA.coins("SUI", "USDC"), ("USDC", "SUI"));
        assert_eq!(SwapDirection::from_a2b(false), SwapDirection::BToA);
        assert!(SwapDirection::from_a2b(true).is_a2b());
    }

    #[test]
    fn swap_target_depends_on_direction() {
        let spec = PoolSpec {
            venue: "cetus".into(),
            address: "0xpool".into(),
            coin_a: "A".into(),
            coin_b: "B".into(),
            keypair: KeypairRef("k".into()),
            package: "0xabc".into(),
            module: "pool_script".into(),
        };
        assert_eq!(spec.swap_target(SwapDirection::AToB), "0xabc::pool_script::swap_a2b");
        assert_eq!(spec.swap_target(SwapDirection::BToA), "0xabc::pool_script::swap_b2a");
    }
}
