//! Engine Constants
//!
//! Fixed-point scales and default risk parameters for the SynthUSD engine.
//! Risk parameters here are defaults; deployments may override them through
//! [`crate::config::RiskParameters`].

/// Liability token metadata
pub mod token {
    /// Token name
    pub const NAME: &str = "SynthUSD";
    /// Token symbol
    pub const SYMBOL: &str = "sUSD";
    /// Decimal places
    pub const DECIMALS: u8 = 18;
    /// One unit with decimals (1 sUSD = 10^18 base units)
    pub const ONE: u128 = 1_000_000_000_000_000_000;
}

/// Fixed-point precision
pub mod precision {
    /// Internal precision for USD values and the health factor (18 decimals)
    pub const PRECISION: u128 = 1_000_000_000_000_000_000;

    /// Decimals reported by price feeds
    pub const FEED_DECIMALS: u8 = 8;

    /// Scale that lifts an 8-decimal feed price to 18 decimals
    pub const ADDITIONAL_FEED_PRECISION: u128 = 10_000_000_000;
}

/// Collateralization and liquidation parameters (percentages of `LIQUIDATION_PRECISION`)
pub mod risk {
    use super::precision::PRECISION;

    /// Share of nominal collateral value counted toward solvency (50 = 50%, i.e. 200% overcollateralized)
    pub const LIQUIDATION_THRESHOLD: u64 = 50;

    /// Denominator for threshold and bonus percentages
    pub const LIQUIDATION_PRECISION: u64 = 100;

    /// Extra collateral paid to a liquidator on top of the repaid debt (10 = 10%)
    pub const LIQUIDATION_BONUS: u64 = 10;

    /// Health factor boundary; positions below it are liquidatable
    pub const MIN_HEALTH_FACTOR: u128 = PRECISION;

    /// Required health factor gain from a liquidation beyond a strict increase
    pub const MIN_HEALTH_FACTOR_IMPROVEMENT: u64 = 0;

    /// Health factor reported for a position without liability
    pub const MAX_HEALTH_FACTOR: u128 = u128::MAX;
}

/// Oracle hardening
pub mod oracle {
    /// Maximum age of a price round before it is considered stale (3 hours)
    pub const PRICE_TIMEOUT_SECS: u64 = 3 * 60 * 60;
}
