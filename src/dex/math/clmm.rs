//! Concentrated liquidity math within the active price range.
//!
//! Prices are Q64.64 square roots of "raw B per raw A", the layout used by Cetus.
//! Fees are expressed in parts per million.

use crate::error::ArbError;

pub const Q64: u128 = 1 << 64;
pub const MIN_SQRT_PRICE: u128 = 4295048016;
pub const MAX_SQRT_PRICE: u128 = 79226673515401279992447579055;
pub const FEE_RATE_DENOMINATOR: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClmmSwap {
    pub output_amount: u64,
    pub fee_amount: u64,
    pub new_sqrt_price: u128,
    pub price_impact: f64,
}

fn to_float(sqrt_price_x64: u128) -> f64 {
    sqrt_price_x64 as f64 / Q64 as f64
}

/// Spot price of one raw unit of A in raw units of B.
pub fn sqrt_price_to_price(sqrt_price_x64: u128) -> Option<f64> {
    if sqrt_price_x64 == 0 {
        return None;
    }
    let sqrt = to_float(sqrt_price_x64);
    Some(sqrt * sqrt)
}

pub fn calculate_swap_output(
    input_amount: u64,
    sqrt_price_x64: u128,
    liquidity: u128,
    fee_rate_ppm: u64,
    a_to_b: bool,
) -> Result<ClmmSwap, ArbError> {
    if input_amount == 0 {
        return Err(ArbError::InvalidAmount("input amount cannot be zero".to_string()));
    }
    if liquidity == 0 {
        return Err(ArbError::InsufficientLiquidity("pool has no active liquidity".to_string()));
    }
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price_x64) {
        return Err(ArbError::InsufficientLiquidity(format!(
            "sqrt price {} outside the valid range",
            sqrt_price_x64
        )));
    }
    if fee_rate_ppm >= FEE_RATE_DENOMINATOR {
        return Err(ArbError::InsufficientLiquidity(format!(
            "fee rate {} ppm leaves nothing to swap",
            fee_rate_ppm
        )));
    }

    let fee_amount = (input_amount as u128 * fee_rate_ppm as u128) / FEE_RATE_DENOMINATOR as u128;
    let input_after_fee = (input_amount as u128 - fee_amount) as f64;

    let sqrt_price = to_float(sqrt_price_x64);
    let l = liquidity as f64;

    let (new_sqrt_price, output, spot) = if a_to_b {
        // Selling A pushes the price down.
        let new_sqrt = l * sqrt_price / (l + input_after_fee * sqrt_price);
        let out = l * (sqrt_price - new_sqrt);
        (new_sqrt, out, sqrt_price * sqrt_price)
    } else {
        // Selling B pushes the price up.
        let new_sqrt = sqrt_price + input_after_fee / l;
        let out = l * (new_sqrt - sqrt_price) / (sqrt_price * new_sqrt);
        (new_sqrt, out, 1.0 / (sqrt_price * sqrt_price))
    };

    let new_sqrt_price_x64 = (new_sqrt_price * Q64 as f64) as u128;
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&new_sqrt_price_x64) {
        return Err(ArbError::InsufficientLiquidity(format!(
            "{} in would push the price out of range",
            input_amount
        )));
    }

    if !output.is_finite() || output < 1.0 {
        return Err(ArbError::InsufficientLiquidity(format!(
            "{} in yields nothing at liquidity {}",
            input_amount, liquidity
        )));
    }
    let output_amount = output.floor().min(u64::MAX as f64) as u64;

    let price_impact = super::price_impact(input_after_fee, output_amount as f64, spot);
    if price_impact >= 1.0 {
        return Err(ArbError::InsufficientLiquidity(format!(
            "{} in would drain the active range",
            input_amount
        )));
    }

    Ok(ClmmSwap {
        output_amount,
        fee_amount: fee_amount as u64,
        new_sqrt_price: new_sqrt_price_x64,
        price_impact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn unit_sqrt_price_is_price_one() {
        assert_approx_eq!(sqrt_price_to_price(Q64).unwrap(), 1.0);
        assert_approx_eq!(sqrt_price_to_price(2 * Q64).unwrap(), 4.0);
        assert_eq!(sqrt_price_to_price(0), None);
    }

    #[test]
    fn a_to_b_lowers_price_and_returns_near_spot() {
        let swap = calculate_swap_output(1_000_000, Q64, 1_000_000_000_000, 0, true).unwrap();
        assert!(swap.new_sqrt_price < Q64);
        // Deep liquidity: close to 1:1 minus a hair of impact.
        assert!(swap.output_amount >= 999_990 && swap.output_amount < 1_000_000);
        assert!(swap.price_impact < 0.0001);
    }

    #[test]
    fn b_to_a_raises_price() {
        let swap = calculate_swap_output(1_000_000, 2 * Q64, 1_000_000_000_000, 2_500, false).unwrap();
        assert!(swap.new_sqrt_price > 2 * Q64);
        assert_eq!(swap.fee_amount, 2_500);
        // Price is 4 B per A, so ~1/4 of the post-fee input comes out.
        assert_approx_eq!(swap.output_amount as f64, 997_500.0 / 4.0, 100.0);
    }

    #[test]
    fn thin_liquidity_has_higher_impact() {
        let deep = calculate_swap_output(1_000_000, Q64, 1_000_000_000_000, 500, true).unwrap();
        let thin = calculate_swap_output(1_000_000, Q64, 2_000_000, 500, true).unwrap();
        assert!(thin.price_impact > deep.price_impact);
    }

    #[test]
    fn zero_liquidity_is_insufficient() {
        assert!(matches!(
            calculate_swap_output(1_000, Q64, 0, 2_500, true),
            Err(ArbError::InsufficientLiquidity(_))
        ));
        assert!(matches!(
            calculate_swap_output(1_000, 1, 1_000_000, 2_500, true),
            Err(ArbError::InsufficientLiquidity(_))
        ));
    }
}
