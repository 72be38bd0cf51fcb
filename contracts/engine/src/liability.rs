//! Liability Ledger
//!
//! Tracks minted liability per account in front of the external token.
//! Minting queues token issuance to the account; burning pulls tokens from a
//! payer into custody and destroys them there.

use tracing::debug;

use synthusd_common::{
    errors::{EngineError, EngineResult},
    events::EngineEvent,
    math::{safe_add, safe_sub},
    types::{is_zero_address, short_hex, Address},
};

use crate::call::PendingCall;
use crate::interaction::Interaction;
use crate::store::LedgerView;

/// Adds `amount` to `account`'s liability and queues issuance
pub fn stage_mint(call: &mut PendingCall<'_>, account: &Address, amount: u128) -> EngineResult<()> {
    if amount == 0 {
        return Err(EngineError::ZeroAmount);
    }
    if is_zero_address(account) {
        return Err(EngineError::InvalidAddress {
            reason: "account cannot be zero address",
        });
    }

    let liability = safe_add(call.liability(account), amount)?;
    call.set_liability(*account, liability);

    call.queue(Interaction::IssueLiability { to: *account, amount });
    call.emit(EngineEvent::LiabilityMinted {
        account: *account,
        amount,
    });

    debug!(account = %short_hex(account), amount, liability, "Mint staged");
    Ok(())
}

/// Repays `amount` of `on_behalf_of`'s liability with `payer`'s tokens
pub fn stage_burn(
    call: &mut PendingCall<'_>,
    on_behalf_of: &Address,
    payer: &Address,
    amount: u128,
) -> EngineResult<()> {
    // 1. Validate
    if amount == 0 {
        return Err(EngineError::ZeroAmount);
    }
    if is_zero_address(on_behalf_of) || is_zero_address(payer) {
        return Err(EngineError::InvalidAddress {
            reason: "account cannot be zero address",
        });
    }

    // 2. Cannot repay more than is owed
    let outstanding = call.liability(on_behalf_of);
    if amount > outstanding {
        return Err(EngineError::BurnExceedsLiability {
            liability: outstanding,
            requested: amount,
        });
    }
    let liability = safe_sub(outstanding, amount)?;
    call.set_liability(*on_behalf_of, liability);

    // 3. Pull into custody, then destroy
    call.queue(Interaction::PullLiability { from: *payer, amount });
    call.queue(Interaction::DestroyLiability { amount });
    call.emit(EngineEvent::LiabilityBurned {
        on_behalf_of: *on_behalf_of,
        payer: *payer,
        amount,
    });

    debug!(
        on_behalf_of = %short_hex(on_behalf_of),
        payer = %short_hex(payer),
        amount,
        liability,
        "Burn staged"
    );
    Ok(())
}
