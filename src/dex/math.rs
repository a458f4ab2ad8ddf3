//! Swap math for the curve families the bot trades against.
//!
//! - `math/constant_product.rs`: x·y = k pools with a basis-point fee
//! - `math/clmm.rs`: concentrated liquidity, evaluated within the active range
//!
//! Both return `InsufficientLiquidity` rather than a zero or saturated output, so
//! callers can abort a whole cycle on the first leg that cannot be filled.

pub mod clmm;
pub mod constant_product;

/// `1 - execution_price / spot_price`, clamped to `[0, 1]`.
pub fn price_impact(input_amount: f64, output_amount: f64, spot_price: f64) -> f64 {
    if input_amount <= 0.0 || spot_price <= 0.0 {
        return 1.0;
    }
    let execution_price = output_amount / input_amount;
    (1.0 - execution_price / spot_price).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn impact_is_zero_at_spot_and_one_when_drained() {
        assert_approx_eq!(price_impact(100.0, 200.0, 2.0), 0.0);
        assert_approx_eq!(price_impact(100.0, 100.0, 2.0), 0.5);
        assert_approx_eq!(price_impact(100.0, 0.0, 2.0), 1.0);
        assert_approx_eq!(price_impact(0.0, 10.0, 2.0), 1.0);
    }
}
