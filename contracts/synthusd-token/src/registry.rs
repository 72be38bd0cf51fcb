//! Collateral token registry

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use synthusd_common::{
    types::{short_hex, Address, AssetId},
    CollateralAssets,
};

use crate::{accepted, FungibleToken};

/// Collateral tokens keyed by asset identifier
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: RwLock<BTreeMap<AssetId, Arc<FungibleToken>>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the token backing `asset`
    pub fn register(&self, asset: AssetId, token: Arc<FungibleToken>) {
        debug!(asset = %short_hex(&asset), symbol = token.symbol(), "Collateral token registered");
        self.tokens.write().insert(asset, token);
    }

    /// Token backing `asset`
    pub fn token(&self, asset: &AssetId) -> Option<Arc<FungibleToken>> {
        self.tokens.read().get(asset).cloned()
    }

    /// Balance of `account` in `asset`, zero for unknown assets
    pub fn balance_of(&self, asset: &AssetId, account: &Address) -> u128 {
        self.token(asset).map(|token| token.balance_of(account)).unwrap_or(0)
    }
}

impl CollateralAssets for TokenRegistry {
    fn transfer_from(
        &self,
        asset: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> bool {
        match self.token(asset) {
            Some(token) => accepted(
                token.symbol(),
                "transfer_from",
                token.transfer_from(spender, from, to, amount),
            ),
            None => {
                debug!(asset = %short_hex(asset), "Transfer of unregistered asset refused");
                false
            }
        }
    }

    fn transfer(&self, asset: &AssetId, from: &Address, to: &Address, amount: u128) -> bool {
        match self.token(asset) {
            Some(token) => accepted(token.symbol(), "transfer", token.transfer(from, to, amount)),
            None => {
                debug!(asset = %short_hex(asset), "Transfer of unregistered asset refused");
                false
            }
        }
    }
}
