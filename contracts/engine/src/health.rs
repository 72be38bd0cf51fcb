//! Health Factor Calculator
//!
//! healthFactor = (collateralUsd * threshold / LIQUIDATION_PRECISION) * PRECISION / liability
//!
//! Collateral value sums every held asset at its current trusted price;
//! assets with a zero balance are never priced. A position without
//! liability reports `MAX_HEALTH_FACTOR` without consulting the oracle.

use tracing::warn;

use synthusd_common::{
    config::RiskParameters,
    constants::risk::{MAX_HEALTH_FACTOR, MIN_HEALTH_FACTOR},
    errors::{EngineError, EngineResult},
    math::{calculate_health_factor, safe_add},
    types::{short_hex, AccountInformation, Address},
};

use crate::price::PriceAdapter;
use crate::registry::AssetRegistry;
use crate::store::LedgerView;

/// Computes solvency over any ledger view
#[derive(Clone, Copy)]
pub struct HealthCalculator<'a> {
    registry: &'a AssetRegistry,
    prices: &'a PriceAdapter,
    risk: &'a RiskParameters,
}

impl<'a> HealthCalculator<'a> {
    pub fn new(registry: &'a AssetRegistry, prices: &'a PriceAdapter, risk: &'a RiskParameters) -> Self {
        Self { registry, prices, risk }
    }

    pub fn registry(&self) -> &'a AssetRegistry {
        self.registry
    }

    pub fn prices(&self) -> &'a PriceAdapter {
        self.prices
    }

    pub fn risk(&self) -> &'a RiskParameters {
        self.risk
    }

    /// Sum of the USD values of every collateral balance of `account`
    pub fn collateral_value_usd(&self, ledger: &dyn LedgerView, account: &Address) -> EngineResult<u128> {
        let mut total = 0u128;
        for (asset, feed) in self.registry.pairs() {
            let amount = ledger.collateral(account, asset);
            if amount == 0 {
                continue;
            }
            total = safe_add(total, self.prices.usd_value(feed, amount)?)?;
        }
        Ok(total)
    }

    pub fn account_information(&self, ledger: &dyn LedgerView, account: &Address) -> EngineResult<AccountInformation> {
        Ok(AccountInformation {
            total_minted: ledger.liability(account),
            collateral_value_usd: self.collateral_value_usd(ledger, account)?,
        })
    }

    pub fn health_factor(&self, ledger: &dyn LedgerView, account: &Address) -> EngineResult<u128> {
        if ledger.liability(account) == 0 {
            return Ok(MAX_HEALTH_FACTOR);
        }
        let info = self.account_information(ledger, account)?;
        Ok(self.calculate(info.total_minted, info.collateral_value_usd))
    }

    /// Pure health factor for the given totals
    pub fn calculate(&self, total_minted: u128, collateral_value_usd: u128) -> u128 {
        calculate_health_factor(total_minted, collateral_value_usd, self.risk.liquidation_threshold)
    }

    /// Returns the health factor, or `BreaksHealthFactor` below the minimum
    pub fn ensure_healthy(&self, ledger: &dyn LedgerView, account: &Address) -> EngineResult<u128> {
        let health_factor = self.health_factor(ledger, account)?;
        if health_factor < MIN_HEALTH_FACTOR {
            warn!(
                account = %short_hex(account),
                health_factor,
                "Health factor below minimum"
            );
            return Err(EngineError::BreaksHealthFactor { health_factor });
        }
        Ok(health_factor)
    }
}
