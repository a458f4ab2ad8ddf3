//! Constant product (x·y = k) AMM math.

use crate::error::ArbError;

pub const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantProductSwap {
    pub output_amount: u64,
    pub fee_amount: u64,
    pub price_impact: f64,
}

/// Units of the output coin per unit of the input coin, before fees.
pub fn spot_price(reserve_in: u64, reserve_out: u64) -> Option<f64> {
    if reserve_in == 0 || reserve_out == 0 {
        return None;
    }
    Some(reserve_out as f64 / reserve_in as f64)
}

/// `out = reserve_out · in_after_fee / (reserve_in + in_after_fee)`, computed in u128.
pub fn calculate_swap_output(
    input_amount: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u64,
) -> Result<ConstantProductSwap, ArbError> {
    if input_amount == 0 {
        return Err(ArbError::InvalidAmount("input amount cannot be zero".to_string()));
    }
    let spot = spot_price(reserve_in, reserve_out)
        .ok_or_else(|| ArbError::InsufficientLiquidity("pool has no liquidity".to_string()))?;
    if fee_bps >= BPS_DENOMINATOR {
        return Err(ArbError::InsufficientLiquidity(format!(
            "fee of {} bps leaves nothing to swap",
            fee_bps
        )));
    }

    let fee_amount = (input_amount as u128 * fee_bps as u128) / BPS_DENOMINATOR as u128;
    let input_after_fee = input_amount as u128 - fee_amount;

    let output_amount =
        (reserve_out as u128 * input_after_fee) / (reserve_in as u128 + input_after_fee);

    if output_amount == 0 {
        return Err(ArbError::InsufficientLiquidity(format!(
            "{} in yields nothing against reserves {}/{}",
            input_amount, reserve_in, reserve_out
        )));
    }

    // Bounded by reserve_out, so the narrowing cannot truncate.
    let output_amount = output_amount as u64;
    let price_impact =
        super::price_impact(input_after_fee as f64, output_amount as f64, spot);

    if price_impact >= 1.0 {
        return Err(ArbError::InsufficientLiquidity(format!(
            "{} in would drain the pool",
            input_amount
        )));
    }

    Ok(ConstantProductSwap {
        output_amount,
        fee_amount: fee_amount as u64,
        price_impact,
    })
}
