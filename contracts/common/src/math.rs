//! Fixed-Point Math for the SynthUSD Engine
//!
//! Amounts are `u128` with 18 decimals. Products of two 18-decimal values are
//! formed in 256 bits and divided back down before narrowing to `u128`.

use alloy_primitives::U256;

use crate::constants::{
    precision::{ADDITIONAL_FEED_PRECISION, PRECISION},
    risk::{LIQUIDATION_PRECISION, MAX_HEALTH_FACTOR},
};
use crate::errors::{EngineError, EngineResult};

/// Computes `a * b / denominator` with a 256-bit intermediate, rounding down
pub fn mul_div(a: u128, b: u128, denominator: u128) -> EngineResult<u128> {
    if denominator == 0 {
        return Err(EngineError::DivisionByZero);
    }

    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(EngineError::Overflow)?;

    u128::try_from(product / U256::from(denominator)).map_err(|_| EngineError::Overflow)
}

/// `a * b / denominator`, rounding up
pub fn mul_div_up(a: u128, b: u128, denominator: u128) -> EngineResult<u128> {
    if denominator == 0 {
        return Err(EngineError::DivisionByZero);
    }

    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(EngineError::Overflow)?;
    let denominator = U256::from(denominator);
    let quotient = (product + denominator - U256::from(1u8)) / denominator;

    u128::try_from(quotient).map_err(|_| EngineError::Overflow)
}

/// Lifts an 8-decimal feed price to 18 decimals
pub fn normalize_price(price: u128) -> EngineResult<u128> {
    price
        .checked_mul(ADDITIONAL_FEED_PRECISION)
        .ok_or(EngineError::Overflow)
}

/// USD value (18 decimals) of `amount` units priced at an 8-decimal feed price
///
/// usd = price * 1e10 * amount / 1e18
pub fn usd_value(price: u128, amount: u128) -> EngineResult<u128> {
    mul_div(normalize_price(price)?, amount, PRECISION)
}

/// Amount of collateral worth `usd_amount` at an 8-decimal feed price
///
/// amount = usd * 1e18 / (price * 1e10)
pub fn token_amount_from_usd(price: u128, usd_amount: u128) -> EngineResult<u128> {
    mul_div(usd_amount, PRECISION, normalize_price(price)?)
}

/// Like [`token_amount_from_usd`], but never worth less than `usd_amount`
pub fn token_amount_from_usd_up(price: u128, usd_amount: u128) -> EngineResult<u128> {
    mul_div_up(usd_amount, PRECISION, normalize_price(price)?)
}

/// Calculate the health factor of a position
///
/// HF = (collateral_usd * threshold / LIQUIDATION_PRECISION) * PRECISION / liability
///
/// # Arguments
/// * `total_minted` - Outstanding liability
/// * `collateral_value_usd` - Sum of collateral USD values (18 decimals)
/// * `liquidation_threshold` - Haircut numerator over `LIQUIDATION_PRECISION`
///
/// # Returns
/// HF scaled by `PRECISION`; `MAX_HEALTH_FACTOR` when nothing is owed. Values
/// that do not fit in `u128` are clamped to `MAX_HEALTH_FACTOR`.
pub fn calculate_health_factor(
    total_minted: u128,
    collateral_value_usd: u128,
    liquidation_threshold: u64,
) -> u128 {
    if total_minted == 0 {
        return MAX_HEALTH_FACTOR; // Infinite ratio for zero liability
    }

    let adjusted = U256::from(collateral_value_usd) * U256::from(liquidation_threshold)
        / U256::from(LIQUIDATION_PRECISION);

    // adjusted < 2^128 * 100, times 1e18 stays far below 2^256
    let factor = adjusted * U256::from(PRECISION) / U256::from(total_minted);

    u128::try_from(factor).unwrap_or(MAX_HEALTH_FACTOR)
}

/// Applies a percentage (over `LIQUIDATION_PRECISION`) to an amount, rounding down
pub fn percent_of(amount: u128, percent: u64) -> EngineResult<u128> {
    mul_div(amount, percent as u128, LIQUIDATION_PRECISION as u128)
}

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_add(b).ok_or(EngineError::Overflow)
}

/// Safe subtraction; callers report domain errors before reaching this
pub fn safe_sub(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_sub(b).ok_or(EngineError::Overflow)
}
