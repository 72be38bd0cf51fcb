//! Collaborator Interfaces
//!
//! The engine never touches token supply or price data directly. It reaches
//! the outside world through these traits, injected at construction.
//!
//! Token methods return `false` when the collaborator refuses; the engine
//! treats a refusal and any internal failure of the collaborator alike.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{Address, AssetId, FeedId, PriceRound};

/// Source of USD prices for collateral assets
pub trait PriceOracle: Send + Sync {
    /// Latest round of `feed`, or `None` if the feed is unknown to the oracle
    fn latest_round(&self, feed: &FeedId) -> Option<PriceRound>;
}

/// Fungible collateral tokens, addressed by asset identifier
pub trait CollateralAssets: Send + Sync {
    /// Moves `amount` of `asset` from `from` to `to` using `spender`'s allowance
    fn transfer_from(
        &self,
        asset: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> bool;

    /// Moves `amount` of `asset` out of `from`'s own balance
    fn transfer(&self, asset: &AssetId, from: &Address, to: &Address, amount: u128) -> bool;
}

/// The pegged liability token; the engine must own its minting rights
pub trait LiabilityToken: Send + Sync {
    /// Issues `amount` new tokens to `to`, authorized by `minter`
    fn mint(&self, minter: &Address, to: &Address, amount: u128) -> bool;

    /// Destroys `amount` tokens from `holder`'s own balance
    fn burn(&self, holder: &Address, amount: u128) -> bool;

    /// Moves tokens from `from` to `to` using `spender`'s allowance
    fn transfer_from(&self, spender: &Address, from: &Address, to: &Address, amount: u128) -> bool;

    /// Moves tokens out of `from`'s own balance
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> bool;
}

/// Wall clock used for oracle staleness checks
pub trait Clock: Send + Sync {
    /// Current unix time in seconds
    fn now(&self) -> u64;
}

/// System time clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for simulations and tests
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    /// Creates a clock frozen at `now`
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Moves the clock to `now`
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward by `secs`
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
