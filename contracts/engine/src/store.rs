//! Ledger Store
//!
//! The engine's exclusively owned position state: collateral per
//! (account, asset) and liability per account. Zero positions are not
//! stored, so an emptied position is indistinguishable from one that never
//! existed.

use std::collections::BTreeMap;

use synthusd_common::types::{Address, AssetId, CollateralEntry, LedgerSnapshot, LiabilityEntry};

/// Read access to position balances
pub trait LedgerView {
    /// Collateral of `account` in `asset`
    fn collateral(&self, account: &Address, asset: &AssetId) -> u128;

    /// Outstanding liability of `account`
    fn liability(&self, account: &Address) -> u128;
}

/// Balances written by one call, applied together on commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerWrites {
    pub collateral: BTreeMap<(Address, AssetId), u128>,
    pub liability: BTreeMap<Address, u128>,
}

/// Committed position state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerStore {
    collateral: BTreeMap<(Address, AssetId), u128>,
    liability: BTreeMap<Address, u128>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a committed call's writes
    pub fn apply(&mut self, writes: LedgerWrites) {
        for (key, amount) in writes.collateral {
            if amount == 0 {
                self.collateral.remove(&key);
            } else {
                self.collateral.insert(key, amount);
            }
        }
        for (account, amount) in writes.liability {
            if amount == 0 {
                self.liability.remove(&account);
            } else {
                self.liability.insert(account, amount);
            }
        }
    }

    /// Copy of every nonzero position
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            collateral: self
                .collateral
                .iter()
                .map(|(&(account, asset), &amount)| CollateralEntry { account, asset, amount })
                .collect(),
            liability: self
                .liability
                .iter()
                .map(|(&account, &amount)| LiabilityEntry { account, amount })
                .collect(),
        }
    }

    /// Accounts with outstanding liability
    pub fn debtors(&self) -> impl Iterator<Item = &Address> {
        self.liability.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.collateral.is_empty() && self.liability.is_empty()
    }
}

impl LedgerView for LedgerStore {
    fn collateral(&self, account: &Address, asset: &AssetId) -> u128 {
        self.collateral.get(&(*account, *asset)).copied().unwrap_or(0)
    }

    fn liability(&self, account: &Address) -> u128 {
        self.liability.get(account).copied().unwrap_or(0)
    }
}
