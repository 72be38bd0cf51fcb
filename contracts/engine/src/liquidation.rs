//! Liquidation Engine
//!
//! Anyone may repay part of an undercollateralized position's liability and
//! receive the equivalent collateral plus a bonus.
//!
//! ## Flow
//! 1. Target must be below `MIN_HEALTH_FACTOR`
//! 2. Collateral owed = tokenAmountFromUsd(debt) * (1 + bonus)
//! 3. Seize it from the target, delivered to the liquidator
//! 4. Burn the debt from the target's liability using the liquidator's tokens
//! 5. Target's health factor must rise by more than the configured minimum
//! 6. Liquidator's own position must stay healthy

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use synthusd_common::{
    constants::risk::MIN_HEALTH_FACTOR,
    errors::{EngineError, EngineResult},
    events::EngineEvent,
    math::{percent_of, safe_add},
    types::{is_zero_address, short_hex, Address, AssetId},
};

use crate::call::PendingCall;
use crate::collateral::stage_redeem;
use crate::health::HealthCalculator;
use crate::liability::stage_burn;
use crate::store::LedgerView;

/// Result of a successful liquidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    /// Liability repaid on behalf of the target
    pub debt_covered: u128,
    /// Collateral equivalent of the repaid debt
    pub base_collateral: u128,
    /// Bonus collateral on top of the equivalent
    pub bonus_collateral: u128,
    /// Total collateral seized (`base + bonus`)
    pub collateral_seized: u128,
    pub starting_health_factor: u128,
    pub ending_health_factor: u128,
}

/// Stages a liquidation of `target` by `liquidator`
pub fn stage_liquidation(
    call: &mut PendingCall<'_>,
    health: &HealthCalculator<'_>,
    liquidator: &Address,
    target: &Address,
    asset: &AssetId,
    debt_to_cover: u128,
) -> EngineResult<LiquidationOutcome> {
    // 1. Validate inputs
    if debt_to_cover == 0 {
        return Err(EngineError::ZeroAmount);
    }
    if is_zero_address(target) {
        return Err(EngineError::InvalidAddress {
            reason: "liquidation target cannot be zero address",
        });
    }
    if is_zero_address(liquidator) {
        return Err(EngineError::InvalidAddress {
            reason: "liquidator cannot be zero address",
        });
    }
    let feed = health.registry().feed_of(asset)?;

    // 2. Only unhealthy positions
    let starting_health_factor = health.health_factor(&*call, target)?;
    if starting_health_factor >= MIN_HEALTH_FACTOR {
        return Err(EngineError::HealthFactorOk {
            health_factor: starting_health_factor,
        });
    }

    // 3. Collateral owed, including bonus. Base rounds up so the seizure is
    //    never worth less than the debt repaid.
    let base_collateral = health.prices().token_amount_from_usd_up(&feed, debt_to_cover)?;
    let bonus_collateral = percent_of(base_collateral, health.risk().liquidation_bonus)?;
    let collateral_seized = safe_add(base_collateral, bonus_collateral)?;

    let available = call.collateral(target, asset);
    if available < collateral_seized {
        return Err(EngineError::InsufficientCollateral {
            available,
            required: collateral_seized,
        });
    }

    // 4. Seize and repay
    stage_redeem(call, health.registry(), asset, target, liquidator, collateral_seized)?;
    stage_burn(call, target, liquidator, debt_to_cover)?;

    // 5. Target must improve
    let ending_health_factor = health.health_factor(&*call, target)?;
    let required = safe_add(
        starting_health_factor,
        u128::from(health.risk().min_health_factor_improvement),
    )?;
    if ending_health_factor <= required {
        warn!(
            target = %short_hex(target),
            starting = starting_health_factor,
            ending = ending_health_factor,
            "Liquidation did not improve health factor"
        );
        return Err(EngineError::HealthFactorNotImproved {
            starting: starting_health_factor,
            ending: ending_health_factor,
        });
    }

    // 6. Liquidator stays solvent
    health.ensure_healthy(&*call, liquidator)?;

    call.emit(EngineEvent::LiquidationExecuted {
        liquidator: *liquidator,
        target: *target,
        asset: *asset,
        debt_covered: debt_to_cover,
        collateral_seized,
        starting_health_factor,
        ending_health_factor,
    });

    debug!(
        liquidator = %short_hex(liquidator),
        target = %short_hex(target),
        debt_to_cover,
        collateral_seized,
        starting_health_factor,
        ending_health_factor,
        "Liquidation staged"
    );

    Ok(LiquidationOutcome {
        debt_covered: debt_to_cover,
        base_collateral,
        bonus_collateral,
        collateral_seized,
        starting_health_factor,
        ending_health_factor,
    })
}
