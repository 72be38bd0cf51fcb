//! Call Staging
//!
//! A mutating call never writes the store directly. It stages balance writes,
//! interactions and events in a [`PendingCall`] overlay; reads see the
//! overlay first. Dropping the overlay discards everything, which is the
//! rollback for any error raised while staging.

use synthusd_common::{
    events::EngineEvent,
    types::{Address, AssetId},
};

use crate::interaction::{Interaction, Phase};
use crate::store::{LedgerStore, LedgerView, LedgerWrites};

/// Uncommitted state of a call in flight
#[derive(Debug)]
pub struct PendingCall<'a> {
    base: &'a LedgerStore,
    writes: LedgerWrites,
    interactions: Vec<Interaction>,
    events: Vec<EngineEvent>,
}

/// A fully staged call, ready to interact and commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedCall {
    pub writes: LedgerWrites,
    /// Interactions in execution order
    pub interactions: Vec<Interaction>,
    pub events: Vec<EngineEvent>,
}

impl<'a> PendingCall<'a> {
    pub fn new(base: &'a LedgerStore) -> Self {
        Self {
            base,
            writes: LedgerWrites::default(),
            interactions: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn set_collateral(&mut self, account: Address, asset: AssetId, amount: u128) {
        self.writes.collateral.insert((account, asset), amount);
    }

    pub fn set_liability(&mut self, account: Address, amount: u128) {
        self.writes.liability.insert(account, amount);
    }

    pub fn queue(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    pub fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Queued interactions in staging order
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Seals the call, ordering interactions by phase
    ///
    /// The sort is stable, so interactions of the same phase keep staging order.
    pub fn finish(self) -> StagedCall {
        let mut interactions = self.interactions;
        interactions.sort_by_key(Interaction::phase);
        debug_assert!(
            interactions.iter().filter(|i| i.phase() == Phase::Deliver).count() <= 1,
            "a call delivers at most once"
        );

        StagedCall {
            writes: self.writes,
            interactions,
            events: self.events,
        }
    }
}

impl LedgerView for PendingCall<'_> {
    fn collateral(&self, account: &Address, asset: &AssetId) -> u128 {
        match self.writes.collateral.get(&(*account, *asset)) {
            Some(amount) => *amount,
            None => self.base.collateral(account, asset),
        }
    }

    fn liability(&self, account: &Address) -> u128 {
        match self.writes.liability.get(account) {
            Some(amount) => *amount,
            None => self.base.liability(account),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = [1u8; 32];
    const WETH: AssetId = [0x11; 32];

    #[test]
    fn test_overlay_reads_through() {
        let mut store = LedgerStore::new();
        let mut writes = LedgerWrites::default();
        writes.collateral.insert((ALICE, WETH), 10);
        writes.liability.insert(ALICE, 4);
        store.apply(writes);

        let mut call = PendingCall::new(&store);
        assert_eq!(call.collateral(&ALICE, &WETH), 10);

        call.set_collateral(ALICE, WETH, 0);
        call.set_liability(ALICE, 9);
        assert_eq!(call.collateral(&ALICE, &WETH), 0);
        assert_eq!(call.liability(&ALICE), 9);

        // Base untouched until commit
        assert_eq!(store.collateral(&ALICE, &WETH), 10);
        assert_eq!(store.liability(&ALICE), 4);
    }

    #[test]
    fn test_finish_orders_by_phase() {
        let store = LedgerStore::new();
        let mut call = PendingCall::new(&store);

        // Liquidation stages the seizure before the repayment
        call.queue(Interaction::PushCollateral { asset: WETH, to: ALICE, amount: 3 });
        call.queue(Interaction::PullLiability { from: ALICE, amount: 2 });
        call.queue(Interaction::DestroyLiability { amount: 2 });
        call.emit(EngineEvent::LiabilityMinted { account: ALICE, amount: 1 });

        let staged = call.finish();
        let phases: Vec<_> = staged.interactions.iter().map(Interaction::phase).collect();
        assert_eq!(phases, vec![Phase::Pull, Phase::Destroy, Phase::Deliver]);
        assert_eq!(staged.events.len(), 1);
    }
}
