//! Price Oracle
//!
//! Aggregator-style USD price feeds for SynthUSD collateral assets.
//!
//! Each feed publishes rounds `(round_id, answer, started_at, updated_at,
//! answered_in_round)` with 8-decimal answers. An admin registers feeds and
//! assigns each an operator; only the operator may publish new rounds.
//!
//! The registry reports whatever its operators publish, including zero,
//! negative or old answers. Consumers decide what to accept; the engine
//! rejects non-positive and stale rounds.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use synthusd_common::{
    constants::precision::FEED_DECIMALS,
    types::{is_zero_address, short_hex, Address, FeedId, PriceRound},
    PriceOracle,
};

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Oracle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Caller is not authorized for this operation
    #[error("caller is not authorized")]
    Unauthorized { expected: Address, actual: Address },

    /// Feed is not registered
    #[error("feed is not registered")]
    FeedNotFound { feed: FeedId },

    /// Feed is already registered
    #[error("feed is already registered")]
    FeedAlreadyRegistered { feed: FeedId },

    /// Zero address supplied
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: &'static str },

    /// New operator equals the current one
    #[error("operator unchanged")]
    SameOperator,
}

// ============ Feed State ============

/// State of a single price feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FeedState {
    /// Authorized operator (can publish rounds)
    pub operator: Address,
    /// Decimals of published answers
    pub decimals: u8,
    /// Most recent round
    pub latest: PriceRound,
}

impl FeedState {
    /// Create a feed with its first round
    pub fn new(operator: Address, initial_answer: i128, now: u64) -> Self {
        Self {
            operator,
            decimals: FEED_DECIMALS,
            latest: PriceRound::new(1, initial_answer, now),
        }
    }
}

// ============ Feed Registry ============

/// Registry of price feeds keyed by feed identifier
#[derive(Debug)]
pub struct PriceFeedRegistry {
    /// Admin (registers feeds, changes operators)
    admin: Address,
    feeds: RwLock<BTreeMap<FeedId, FeedState>>,
}

impl PriceFeedRegistry {
    /// Create an empty registry administered by `admin`
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            feeds: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registry admin
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Register a feed with its operator and first answer
    pub fn register_feed(
        &self,
        caller: &Address,
        feed: FeedId,
        operator: Address,
        initial_answer: i128,
        now: u64,
    ) -> OracleResult<()> {
        // 1. Only admin can register feeds
        self.ensure_admin(caller)?;

        // 2. Addresses must be real
        if is_zero_address(&feed) {
            return Err(OracleError::InvalidAddress {
                reason: "feed cannot be zero address",
            });
        }
        if is_zero_address(&operator) {
            return Err(OracleError::InvalidAddress {
                reason: "operator cannot be zero address",
            });
        }

        // 3. One registration per feed
        let mut feeds = self.feeds.write();
        if feeds.contains_key(&feed) {
            return Err(OracleError::FeedAlreadyRegistered { feed });
        }

        feeds.insert(feed, FeedState::new(operator, initial_answer, now));
        info!(feed = %short_hex(&feed), answer = initial_answer, "Price feed registered");
        Ok(())
    }

    /// Publish a new answer as the next round
    pub fn update_answer(
        &self,
        caller: &Address,
        feed: &FeedId,
        answer: i128,
        now: u64,
    ) -> OracleResult<PriceRound> {
        let mut feeds = self.feeds.write();
        let state = feeds.get_mut(feed).ok_or(OracleError::FeedNotFound { feed: *feed })?;
        ensure_operator(state, caller)?;

        let round = PriceRound::new(state.latest.round_id + 1, answer, now);
        state.latest = round;

        debug!(
            feed = %short_hex(feed),
            round = round.round_id,
            answer,
            "Price updated"
        );
        Ok(round)
    }

    /// Overwrite the latest round with arbitrary data
    ///
    /// Lets an operator publish incomplete or backdated rounds, as a real
    /// aggregator can.
    pub fn update_round_data(&self, caller: &Address, feed: &FeedId, round: PriceRound) -> OracleResult<()> {
        let mut feeds = self.feeds.write();
        let state = feeds.get_mut(feed).ok_or(OracleError::FeedNotFound { feed: *feed })?;
        ensure_operator(state, caller)?;

        state.latest = round;
        Ok(())
    }

    /// Change a feed's operator
    pub fn set_operator(&self, caller: &Address, feed: &FeedId, new_operator: Address) -> OracleResult<()> {
        // 1. Only admin can change operator
        self.ensure_admin(caller)?;

        if is_zero_address(&new_operator) {
            return Err(OracleError::InvalidAddress {
                reason: "operator cannot be zero address",
            });
        }

        let mut feeds = self.feeds.write();
        let state = feeds.get_mut(feed).ok_or(OracleError::FeedNotFound { feed: *feed })?;

        // 2. New operator must be different
        if state.operator == new_operator {
            return Err(OracleError::SameOperator);
        }

        state.operator = new_operator;
        info!(feed = %short_hex(feed), operator = %short_hex(&new_operator), "Feed operator changed");
        Ok(())
    }

    /// Feed state, if registered
    pub fn feed(&self, feed: &FeedId) -> Option<FeedState> {
        self.feeds.read().get(feed).cloned()
    }

    /// Decimals of a feed's answers
    pub fn decimals(&self, feed: &FeedId) -> Option<u8> {
        self.feeds.read().get(feed).map(|state| state.decimals)
    }

    fn ensure_admin(&self, caller: &Address) -> OracleResult<()> {
        if *caller != self.admin {
            return Err(OracleError::Unauthorized {
                expected: self.admin,
                actual: *caller,
            });
        }
        Ok(())
    }
}

fn ensure_operator(state: &FeedState, caller: &Address) -> OracleResult<()> {
    if *caller != state.operator {
        return Err(OracleError::Unauthorized {
            expected: state.operator,
            actual: *caller,
        });
    }
    Ok(())
}

impl PriceOracle for PriceFeedRegistry {
    fn latest_round(&self, feed: &FeedId) -> Option<PriceRound> {
        self.feeds.read().get(feed).map(|state| state.latest)
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    const ETH_PRICE_2000: i128 = 2_000_00000000;
    const ADMIN: Address = [1u8; 32];
    const OPERATOR: Address = [2u8; 32];
    const FEED: FeedId = [3u8; 32];

    fn registry() -> PriceFeedRegistry {
        let registry = PriceFeedRegistry::new(ADMIN);
        registry
            .register_feed(&ADMIN, FEED, OPERATOR, ETH_PRICE_2000, 1_000)
            .unwrap();
        registry
    }

    #[test]
    fn test_register_feed() {
        let registry = registry();

        let round = registry.latest_round(&FEED).unwrap();
        assert_eq!(round.round_id, 1);
        assert_eq!(round.answer, ETH_PRICE_2000);
        assert_eq!(round.updated_at, 1_000);
        assert_eq!(registry.decimals(&FEED), Some(8));
        assert!(registry.latest_round(&[9u8; 32]).is_none());
    }

    #[test]
    fn test_register_feed_unauthorized() {
        let registry = PriceFeedRegistry::new(ADMIN);
        let result = registry.register_feed(&OPERATOR, FEED, OPERATOR, ETH_PRICE_2000, 0);
        assert!(matches!(result, Err(OracleError::Unauthorized { .. })));
    }

    #[test]
    fn test_register_feed_twice() {
        let registry = registry();
        let result = registry.register_feed(&ADMIN, FEED, OPERATOR, ETH_PRICE_2000, 0);
        assert_eq!(result, Err(OracleError::FeedAlreadyRegistered { feed: FEED }));
    }

    #[test]
    fn test_update_answer_increments_round() {
        let registry = registry();

        let round = registry.update_answer(&OPERATOR, &FEED, 1_800_00000000, 2_000).unwrap();
        assert_eq!(round.round_id, 2);
        assert_eq!(round.answered_in_round, 2);
        assert_eq!(registry.latest_round(&FEED), Some(round));
    }

    #[test]
    fn test_update_answer_unauthorized() {
        let registry = registry();
        let result = registry.update_answer(&ADMIN, &FEED, 1, 2_000);
        assert!(matches!(result, Err(OracleError::Unauthorized { .. })));
    }

    #[test]
    fn test_non_positive_answers_are_published() {
        // Validation belongs to consumers
        let registry = registry();
        registry.update_answer(&OPERATOR, &FEED, -5, 2_000).unwrap();
        assert_eq!(registry.latest_round(&FEED).unwrap().answer, -5);
    }

    #[test]
    fn test_update_round_data() {
        let registry = registry();
        let round = PriceRound {
            round_id: 7,
            answer: ETH_PRICE_2000,
            started_at: 10,
            updated_at: 10,
            answered_in_round: 6,
        };

        registry.update_round_data(&OPERATOR, &FEED, round).unwrap();
        assert_eq!(registry.latest_round(&FEED), Some(round));
        assert!(!registry.latest_round(&FEED).unwrap().is_complete());
    }

    #[test]
    fn test_set_operator() {
        let registry = registry();
        let new_operator = [4u8; 32];

        assert_eq!(
            registry.set_operator(&ADMIN, &FEED, OPERATOR),
            Err(OracleError::SameOperator)
        );

        registry.set_operator(&ADMIN, &FEED, new_operator).unwrap();
        assert_eq!(registry.feed(&FEED).unwrap().operator, new_operator);
        assert!(registry.update_answer(&OPERATOR, &FEED, 1, 0).is_err());
        assert!(registry.update_answer(&new_operator, &FEED, 1, 0).is_ok());
    }
}
