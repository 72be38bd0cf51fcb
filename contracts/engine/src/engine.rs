//! SynthUSD Engine
//!
//! Public entry points. Every mutating call runs the same pipeline:
//!
//! ```text
//! enter scope ──► stage (validate, write overlay, health checks)
//!                   │ error: drop overlay
//!                   ▼
//!               interact (pull ► destroy ► deliver)
//!                   │ error: compensate, drop overlay
//!                   ▼
//!               commit overlay ──► publish events ──► leave scope
//! ```
//!
//! Nothing is written to the store before every check has passed and every
//! interaction has succeeded, so a failed call leaves no trace.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use synthusd_common::{
    config::{EngineConfig, RiskParameters},
    errors::EngineResult,
    events::{EngineEvent, EventLog},
    types::{short_hex, AccountInformation, Address, AssetId, FeedId, LedgerSnapshot},
    Clock, CollateralAssets, LiabilityToken, PriceOracle,
};

use crate::call::{PendingCall, StagedCall};
use crate::collateral::{stage_deposit, stage_redeem};
use crate::guard::CallSequencer;
use crate::health::HealthCalculator;
use crate::interaction::InteractionExecutor;
use crate::liability::{stage_burn, stage_mint};
use crate::liquidation::{stage_liquidation, LiquidationOutcome};
use crate::price::PriceAdapter;
use crate::registry::AssetRegistry;
use crate::store::{LedgerStore, LedgerView};

/// External collaborators injected at construction
#[derive(Clone)]
pub struct Collaborators {
    pub oracle: Arc<dyn PriceOracle>,
    pub collateral: Arc<dyn CollateralAssets>,
    /// Must have handed minting rights to the engine address
    pub liability: Arc<dyn LiabilityToken>,
    pub clock: Arc<dyn Clock>,
}

/// Overcollateralized synthetic-dollar engine
pub struct SynthUsdEngine {
    address: Address,
    risk: RiskParameters,
    registry: AssetRegistry,
    prices: PriceAdapter,
    collateral: Arc<dyn CollateralAssets>,
    liability: Arc<dyn LiabilityToken>,
    sequencer: CallSequencer,
    store: RwLock<LedgerStore>,
    events: Mutex<EventLog>,
}

impl SynthUsdEngine {
    /// Validates `config` and builds an engine with an empty ledger
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> EngineResult<Self> {
        config.validate()?;

        let registry = AssetRegistry::from_config(&config);
        info!(
            engine = %short_hex(&config.engine_address),
            assets = registry.assets().len(),
            registry = ?config.describe(),
            threshold = config.risk.liquidation_threshold,
            bonus = config.risk.liquidation_bonus,
            "SynthUSD engine initialized"
        );

        Ok(Self {
            address: config.engine_address,
            risk: config.risk,
            registry,
            prices: PriceAdapter::new(collaborators.oracle, collaborators.clock, config.oracle),
            collateral: collaborators.collateral,
            liability: collaborators.liability,
            sequencer: CallSequencer::new(),
            store: RwLock::new(LedgerStore::new()),
            events: Mutex::new(EventLog::new()),
        })
    }

    // ============ Mutating Calls ============

    /// Locks `amount` of `asset` from `account` as collateral
    pub fn deposit_collateral(&self, account: &Address, asset: &AssetId, amount: u128) -> EngineResult<()> {
        self.run_call("deposit_collateral", |call| {
            stage_deposit(call, &self.registry, account, asset, amount)
        })
    }

    /// Returns `amount` of `asset` to `account` if the position stays healthy
    ///
    /// Health is checked on the staged post-state before any token moves, so
    /// a redemption that would both break health and fail to transfer reports
    /// `BreaksHealthFactor`.
    pub fn redeem_collateral(&self, account: &Address, asset: &AssetId, amount: u128) -> EngineResult<()> {
        self.run_call("redeem_collateral", |call| {
            stage_redeem(call, &self.registry, asset, account, account, amount)?;
            self.health().ensure_healthy(&*call, account)?;
            Ok(())
        })
    }

    /// Mints `amount` of liability to `account` if the position stays healthy
    pub fn mint(&self, account: &Address, amount: u128) -> EngineResult<()> {
        self.run_call("mint", |call| {
            stage_mint(call, account, amount)?;
            self.health().ensure_healthy(&*call, account)?;
            Ok(())
        })
    }

    /// Repays `amount` of `account`'s liability with its own tokens
    ///
    /// Errors take the same precedence as [`Self::redeem_collateral`]: a
    /// failing health check is reported before a refused pull.
    pub fn burn(&self, account: &Address, amount: u128) -> EngineResult<()> {
        self.run_call("burn", |call| {
            stage_burn(call, account, account, amount)?;
            self.health().ensure_healthy(&*call, account)?;
            Ok(())
        })
    }

    /// Deposit then mint, as one call
    pub fn deposit_collateral_and_mint(
        &self,
        account: &Address,
        asset: &AssetId,
        collateral_amount: u128,
        mint_amount: u128,
    ) -> EngineResult<()> {
        self.run_call("deposit_collateral_and_mint", |call| {
            stage_deposit(call, &self.registry, account, asset, collateral_amount)?;
            stage_mint(call, account, mint_amount)?;
            self.health().ensure_healthy(&*call, account)?;
            Ok(())
        })
    }

    /// Burn then redeem, as one call
    pub fn redeem_collateral_for_burn(
        &self,
        account: &Address,
        asset: &AssetId,
        collateral_amount: u128,
        burn_amount: u128,
    ) -> EngineResult<()> {
        self.run_call("redeem_collateral_for_burn", |call| {
            stage_burn(call, account, account, burn_amount)?;
            stage_redeem(call, &self.registry, asset, account, account, collateral_amount)?;
            self.health().ensure_healthy(&*call, account)?;
            Ok(())
        })
    }

    /// Repays `debt_to_cover` of `target`'s liability for its collateral plus bonus
    pub fn liquidate(
        &self,
        liquidator: &Address,
        target: &Address,
        asset: &AssetId,
        debt_to_cover: u128,
    ) -> EngineResult<LiquidationOutcome> {
        self.run_call("liquidate", |call| {
            stage_liquidation(call, &self.health(), liquidator, target, asset, debt_to_cover)
        })
    }

    // ============ Views ============

    pub fn engine_address(&self) -> Address {
        self.address
    }

    pub fn collateral_balance(&self, account: &Address, asset: &AssetId) -> u128 {
        self.store.read_recursive().collateral(account, asset)
    }

    pub fn liability_of(&self, account: &Address) -> u128 {
        self.store.read_recursive().liability(account)
    }

    pub fn account_information(&self, account: &Address) -> EngineResult<AccountInformation> {
        let store = self.store.read_recursive();
        self.health().account_information(&*store, account)
    }

    pub fn collateral_value_usd(&self, account: &Address) -> EngineResult<u128> {
        let store = self.store.read_recursive();
        self.health().collateral_value_usd(&*store, account)
    }

    /// USD value (18 decimals) of `amount` of `asset`
    pub fn usd_value(&self, asset: &AssetId, amount: u128) -> EngineResult<u128> {
        let feed = self.registry.feed_of(asset)?;
        self.prices.usd_value(&feed, amount)
    }

    /// Amount of `asset` worth `usd_amount`
    pub fn token_amount_from_usd(&self, asset: &AssetId, usd_amount: u128) -> EngineResult<u128> {
        let feed = self.registry.feed_of(asset)?;
        self.prices.token_amount_from_usd(&feed, usd_amount)
    }

    pub fn health_factor(&self, account: &Address) -> EngineResult<u128> {
        let store = self.store.read_recursive();
        self.health().health_factor(&*store, account)
    }

    /// Health factor for arbitrary totals, without touching the ledger or oracle
    pub fn calculate_health_factor(&self, total_minted: u128, collateral_value_usd: u128) -> u128 {
        self.health().calculate(total_minted, collateral_value_usd)
    }

    pub fn collateral_assets(&self) -> &[AssetId] {
        self.registry.assets()
    }

    pub fn price_feed(&self, asset: &AssetId) -> Option<FeedId> {
        self.registry.price_feed(asset)
    }

    pub fn risk_parameters(&self) -> RiskParameters {
        self.risk
    }

    /// Copy of every nonzero position
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.store.read_recursive().snapshot()
    }

    /// Accounts with outstanding liability
    pub fn debtors(&self) -> Vec<Address> {
        self.store.read_recursive().debtors().copied().collect()
    }

    /// Every published event, oldest first
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().events().to_vec()
    }

    /// Running digest over every published event
    pub fn event_digest(&self) -> [u8; 32] {
        self.events.lock().digest()
    }

    // ============ Pipeline ============

    fn health(&self) -> HealthCalculator<'_> {
        HealthCalculator::new(&self.registry, &self.prices, &self.risk)
    }

    fn run_call<T>(
        &self,
        operation: &'static str,
        stage: impl FnOnce(&mut PendingCall<'_>) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let result = self.sequencer.enter().and_then(|_scope| {
            let (staged, value) = {
                let store = self.store.read_recursive();
                let mut call = PendingCall::new(&store);
                let value = stage(&mut call)?;
                (call.finish(), value)
            };

            InteractionExecutor::new(self.address, &*self.collateral, &*self.liability)
                .execute(&staged.interactions)?;
            self.commit(staged);
            Ok(value)
        });

        match &result {
            Ok(_) => info!(operation, "Call committed"),
            Err(err) => debug!(
                operation,
                code = err.code(),
                recoverable = err.is_recoverable(),
                error = %err,
                "Call rolled back"
            ),
        }
        result
    }

    fn commit(&self, staged: StagedCall) {
        let StagedCall { writes, events, .. } = staged;
        self.store.write().apply(writes);
        self.events.lock().extend(events);
    }
}
