//! Price Adapter
//!
//! Reads the latest oracle round for a feed, rejects rounds that cannot be
//! trusted, and converts between collateral amounts and USD.
//!
//! A round is rejected when:
//! - the oracle has no round for the feed (`OracleUnavailable`)
//! - its answer is zero or negative (`InvalidPrice`)
//! - it is incomplete or older than the timeout (`StalePrice`)

use std::sync::Arc;

use tracing::warn;

use synthusd_common::{
    config::OracleGuard,
    errors::{EngineError, EngineResult},
    math,
    types::{short_hex, FeedId},
    Clock, PriceOracle,
};

/// Validated access to the price oracle
pub struct PriceAdapter {
    oracle: Arc<dyn PriceOracle>,
    clock: Arc<dyn Clock>,
    guard: OracleGuard,
}

impl PriceAdapter {
    pub fn new(oracle: Arc<dyn PriceOracle>, clock: Arc<dyn Clock>, guard: OracleGuard) -> Self {
        Self { oracle, clock, guard }
    }

    /// Latest trusted price of `feed` (8 decimals)
    pub fn latest_price(&self, feed: &FeedId) -> EngineResult<u128> {
        let round = self
            .oracle
            .latest_round(feed)
            .ok_or(EngineError::OracleUnavailable { feed: *feed })?;

        if round.answer <= 0 {
            warn!(feed = %short_hex(feed), answer = round.answer, "Non-positive oracle price rejected");
            return Err(EngineError::InvalidPrice {
                feed: *feed,
                answer: round.answer,
            });
        }

        let now = self.clock.now();
        let age = now.saturating_sub(round.updated_at);
        if !round.is_complete() || age > self.guard.price_timeout_secs {
            warn!(
                feed = %short_hex(feed),
                round = round.round_id,
                updated_at = round.updated_at,
                now,
                "Stale oracle round rejected"
            );
            return Err(EngineError::StalePrice {
                feed: *feed,
                updated_at: round.updated_at,
                now,
            });
        }

        u128::try_from(round.answer).map_err(|_| EngineError::Overflow)
    }

    /// USD value (18 decimals) of `amount` priced by `feed`
    pub fn usd_value(&self, feed: &FeedId, amount: u128) -> EngineResult<u128> {
        math::usd_value(self.latest_price(feed)?, amount)
    }

    /// Amount priced by `feed` worth `usd_amount`
    pub fn token_amount_from_usd(&self, feed: &FeedId, usd_amount: u128) -> EngineResult<u128> {
        math::token_amount_from_usd(self.latest_price(feed)?, usd_amount)
    }

    /// Amount priced by `feed` worth at least `usd_amount`
    pub fn token_amount_from_usd_up(&self, feed: &FeedId, usd_amount: u128) -> EngineResult<u128> {
        math::token_amount_from_usd_up(self.latest_price(feed)?, usd_amount)
    }

    pub fn guard(&self) -> &OracleGuard {
        &self.guard
    }
}
