//! External Interactions
//!
//! Token movements a call needs, queued while the call is staged and
//! performed only after every ledger check has passed. Interactions run in
//! phase order:
//!
//! 1. **Pull**: tokens move from users into engine custody
//! 2. **Destroy**: liability tokens held by the engine are burned
//! 3. **Deliver**: collateral pushed out or liability issued
//!
//! A call has at most one delivery and it runs last, so nothing can fail
//! after tokens have left the engine. If an earlier interaction fails, the
//! ones already performed are compensated in reverse order.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use synthusd_common::{
    errors::{EngineError, EngineResult},
    types::{short_hex, Address, AssetId},
    CollateralAssets, LiabilityToken,
};

/// Execution phase of an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Pull,
    Destroy,
    Deliver,
}

/// A queued token movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Collateral from a user into custody
    PullCollateral { asset: AssetId, from: Address, amount: u128 },
    /// Liability tokens from a payer into custody
    PullLiability { from: Address, amount: u128 },
    /// Burn liability tokens held by the engine
    DestroyLiability { amount: u128 },
    /// Collateral out of custody
    PushCollateral { asset: AssetId, to: Address, amount: u128 },
    /// Newly minted liability tokens
    IssueLiability { to: Address, amount: u128 },
}

impl Interaction {
    pub fn phase(&self) -> Phase {
        match self {
            Self::PullCollateral { .. } | Self::PullLiability { .. } => Phase::Pull,
            Self::DestroyLiability { .. } => Phase::Destroy,
            Self::PushCollateral { .. } | Self::IssueLiability { .. } => Phase::Deliver,
        }
    }
}

/// Performs interactions against the token collaborators
pub struct InteractionExecutor<'a> {
    engine: Address,
    collateral: &'a dyn CollateralAssets,
    liability: &'a dyn LiabilityToken,
}

impl<'a> InteractionExecutor<'a> {
    pub fn new(engine: Address, collateral: &'a dyn CollateralAssets, liability: &'a dyn LiabilityToken) -> Self {
        Self {
            engine,
            collateral,
            liability,
        }
    }

    /// Performs `interactions` in order, compensating on the first failure
    pub fn execute(&self, interactions: &[Interaction]) -> EngineResult<()> {
        for (index, interaction) in interactions.iter().enumerate() {
            if let Err(err) = self.perform(interaction) {
                warn!(code = err.code(), error = %err, performed = index, "Interaction failed");
                self.compensate(&interactions[..index]);
                return Err(err);
            }
        }
        Ok(())
    }

    fn perform(&self, interaction: &Interaction) -> EngineResult<()> {
        let engine = &self.engine;
        match *interaction {
            Interaction::PullCollateral { asset, from, amount } => {
                let pulled = guarded("collateral.transfer_from", || {
                    self.collateral.transfer_from(&asset, engine, &from, engine, amount)
                });
                ensure(pulled, EngineError::TransferFailed { from, to: *engine, amount })
            }
            Interaction::PullLiability { from, amount } => {
                let pulled = guarded("liability.transfer_from", || {
                    self.liability.transfer_from(engine, &from, engine, amount)
                });
                ensure(pulled, EngineError::TransferFailed { from, to: *engine, amount })
            }
            Interaction::DestroyLiability { amount } => {
                let burned = guarded("liability.burn", || self.liability.burn(engine, amount));
                ensure(burned, EngineError::BurnFailed { amount })
            }
            Interaction::PushCollateral { asset, to, amount } => {
                let pushed = guarded("collateral.transfer", || {
                    self.collateral.transfer(&asset, engine, &to, amount)
                });
                ensure(pushed, EngineError::TransferFailed { from: *engine, to, amount })
            }
            Interaction::IssueLiability { to, amount } => {
                let minted = guarded("liability.mint", || self.liability.mint(engine, &to, amount));
                ensure(minted, EngineError::MintFailed { to, amount })
            }
        }
    }

    /// Reverses performed interactions, newest first
    fn compensate(&self, performed: &[Interaction]) {
        let engine = &self.engine;
        for interaction in performed.iter().rev() {
            let reversed = match *interaction {
                Interaction::PullCollateral { asset, from, amount } => guarded("collateral.transfer", || {
                    self.collateral.transfer(&asset, engine, &from, amount)
                }),
                Interaction::PullLiability { from, amount } => guarded("liability.transfer", || {
                    self.liability.transfer(engine, &from, amount)
                }),
                Interaction::DestroyLiability { amount } => {
                    guarded("liability.mint", || self.liability.mint(engine, engine, amount))
                }
                // Deliveries run last and are never followed by a failure
                Interaction::PushCollateral { .. } | Interaction::IssueLiability { .. } => false,
            };

            if reversed {
                debug!(interaction = ?interaction, "Interaction compensated");
            } else {
                error!(
                    interaction = ?interaction,
                    engine = %short_hex(engine),
                    "Compensation failed, token state diverged from ledger"
                );
            }
        }
    }
}

fn ensure(accepted: bool, err: EngineError) -> EngineResult<()> {
    if accepted {
        Ok(())
    } else {
        Err(err)
    }
}

/// A collaborator that panics counts as a refusal
fn guarded(operation: &'static str, call: impl FnOnce() -> bool) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(accepted) => accepted,
        Err(_) => {
            warn!(operation, "Collaborator terminated abnormally");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const ENGINE: Address = [0xee; 32];
    const ALICE: Address = [1u8; 32];
    const WETH: AssetId = [0x11; 32];

    /// Records every call and refuses the named operation
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
        refuse: Option<&'static str>,
        panic_on: Option<&'static str>,
    }

    impl Recorder {
        fn refusing(operation: &'static str) -> Self {
            Self {
                refuse: Some(operation),
                ..Self::default()
            }
        }

        fn record(&self, operation: &'static str) -> bool {
            self.calls.lock().push(operation);
            if self.panic_on == Some(operation) {
                panic!("collaborator failure in {operation}");
            }
            self.refuse != Some(operation)
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    impl CollateralAssets for Recorder {
        fn transfer_from(&self, _: &AssetId, _: &Address, _: &Address, _: &Address, _: u128) -> bool {
            self.record("collateral.transfer_from")
        }

        fn transfer(&self, _: &AssetId, _: &Address, _: &Address, _: u128) -> bool {
            self.record("collateral.transfer")
        }
    }

    impl LiabilityToken for Recorder {
        fn mint(&self, _: &Address, _: &Address, _: u128) -> bool {
            self.record("liability.mint")
        }

        fn burn(&self, _: &Address, _: u128) -> bool {
            self.record("liability.burn")
        }

        fn transfer_from(&self, _: &Address, _: &Address, _: &Address, _: u128) -> bool {
            self.record("liability.transfer_from")
        }

        fn transfer(&self, _: &Address, _: &Address, _: u128) -> bool {
            self.record("liability.transfer")
        }
    }

    fn burn_and_redeem() -> Vec<Interaction> {
        vec![
            Interaction::PullLiability { from: ALICE, amount: 5 },
            Interaction::DestroyLiability { amount: 5 },
            Interaction::PushCollateral { asset: WETH, to: ALICE, amount: 1 },
        ]
    }

    #[test]
    fn test_phase_order() {
        assert!(Phase::Pull < Phase::Destroy);
        assert!(Phase::Destroy < Phase::Deliver);
        assert_eq!(Interaction::DestroyLiability { amount: 1 }.phase(), Phase::Destroy);
        assert_eq!(
            Interaction::IssueLiability { to: ALICE, amount: 1 }.phase(),
            Phase::Deliver
        );
    }

    #[test]
    fn test_execute_all() {
        let recorder = Recorder::default();
        let executor = InteractionExecutor::new(ENGINE, &recorder, &recorder);

        executor.execute(&burn_and_redeem()).unwrap();
        assert_eq!(
            recorder.calls(),
            vec!["liability.transfer_from", "liability.burn", "collateral.transfer"]
        );
    }

    #[test]
    fn test_failed_destroy_is_compensated() {
        let recorder = Recorder::refusing("liability.burn");
        let executor = InteractionExecutor::new(ENGINE, &recorder, &recorder);

        let result = executor.execute(&burn_and_redeem());
        assert_eq!(result, Err(EngineError::BurnFailed { amount: 5 }));
        // Pull reversed, push never attempted
        assert_eq!(
            recorder.calls(),
            vec!["liability.transfer_from", "liability.burn", "liability.transfer"]
        );
    }

    #[test]
    fn test_failed_delivery_reverses_in_order() {
        let recorder = Recorder::refusing("liability.mint");
        let executor = InteractionExecutor::new(ENGINE, &recorder, &recorder);
        let interactions = [
            Interaction::PullCollateral { asset: WETH, from: ALICE, amount: 7 },
            Interaction::IssueLiability { to: ALICE, amount: 3 },
        ];

        let result = executor.execute(&interactions);
        assert_eq!(result, Err(EngineError::MintFailed { to: ALICE, amount: 3 }));
        assert_eq!(
            recorder.calls(),
            vec!["collateral.transfer_from", "liability.mint", "collateral.transfer"]
        );
    }

    #[test]
    fn test_panicking_collaborator_is_a_refusal() {
        let recorder = Recorder {
            panic_on: Some("collateral.transfer_from"),
            ..Recorder::default()
        };
        let executor = InteractionExecutor::new(ENGINE, &recorder, &recorder);
        let interactions = [Interaction::PullCollateral { asset: WETH, from: ALICE, amount: 7 }];

        assert_eq!(
            executor.execute(&interactions),
            Err(EngineError::TransferFailed { from: ALICE, to: ENGINE, amount: 7 })
        );
    }
}
