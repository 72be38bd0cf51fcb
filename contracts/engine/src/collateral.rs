//! Collateral Ledger
//!
//! Stages collateral deposits and redemptions. Health checks are the
//! caller's responsibility: deposits never need one, redemptions always do.

use tracing::debug;

use synthusd_common::{
    errors::{EngineError, EngineResult},
    events::EngineEvent,
    math::{safe_add, safe_sub},
    types::{is_zero_address, short_hex, Address, AssetId},
};

use crate::call::PendingCall;
use crate::interaction::Interaction;
use crate::registry::AssetRegistry;
use crate::store::LedgerView;

/// Credits `amount` of `asset` to `account` and queues the pull into custody
pub fn stage_deposit(
    call: &mut PendingCall<'_>,
    registry: &AssetRegistry,
    account: &Address,
    asset: &AssetId,
    amount: u128,
) -> EngineResult<()> {
    // 1. Amount first, so a zero deposit fails the same way for any asset
    if amount == 0 {
        return Err(EngineError::ZeroAmount);
    }

    // 2. Account and asset
    if is_zero_address(account) {
        return Err(EngineError::InvalidAddress {
            reason: "account cannot be zero address",
        });
    }
    registry.ensure_registered(asset)?;

    // 3. Credit
    let balance = safe_add(call.collateral(account, asset), amount)?;
    call.set_collateral(*account, *asset, balance);

    // 4. Pull and announce
    call.queue(Interaction::PullCollateral {
        asset: *asset,
        from: *account,
        amount,
    });
    call.emit(EngineEvent::CollateralDeposited {
        account: *account,
        asset: *asset,
        amount,
    });

    debug!(account = %short_hex(account), asset = %short_hex(asset), amount, balance, "Deposit staged");
    Ok(())
}

/// Debits `amount` of `asset` from `from` and queues its delivery to `to`
///
/// `from == to` for a plain redemption; a liquidation seizes from the target
/// to the liquidator.
pub fn stage_redeem(
    call: &mut PendingCall<'_>,
    registry: &AssetRegistry,
    asset: &AssetId,
    from: &Address,
    to: &Address,
    amount: u128,
) -> EngineResult<()> {
    // 1. Validate
    if amount == 0 {
        return Err(EngineError::ZeroAmount);
    }
    if is_zero_address(from) || is_zero_address(to) {
        return Err(EngineError::InvalidAddress {
            reason: "account cannot be zero address",
        });
    }
    registry.ensure_registered(asset)?;

    // 2. Debit, never below zero
    let available = call.collateral(from, asset);
    if available < amount {
        return Err(EngineError::InsufficientBalance {
            available,
            requested: amount,
        });
    }
    let balance = safe_sub(available, amount)?;
    call.set_collateral(*from, *asset, balance);

    // 3. Deliver and announce
    call.queue(Interaction::PushCollateral {
        asset: *asset,
        to: *to,
        amount,
    });
    call.emit(EngineEvent::CollateralRedeemed {
        from: *from,
        to: *to,
        asset: *asset,
        amount,
    });

    debug!(
        from = %short_hex(from),
        to = %short_hex(to),
        asset = %short_hex(asset),
        amount,
        balance,
        "Redemption staged"
    );
    Ok(())
}
