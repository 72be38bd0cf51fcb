//! SynthUSD Engine
//!
//! Position ledger, health factor calculator and liquidation protocol for an
//! overcollateralized synthetic dollar.
//!
//! ## Components
//!
//! - [`price`]: validated oracle reads and USD conversion
//! - [`collateral`] / [`liability`]: ledger staging for each side of a position
//! - [`health`]: solvency of any account over any ledger view
//! - [`liquidation`]: permissionless repayment of unhealthy positions
//! - [`engine`]: the public entry points
//!
//! ## Guarantees
//!
//! After every successful call each account with liability has a health
//! factor of at least `MIN_HEALTH_FACTOR`. A failed call leaves the ledger,
//! the event log and every token balance as they were.

pub mod call;
pub mod collateral;
pub mod engine;
pub mod guard;
pub mod health;
pub mod interaction;
pub mod liability;
pub mod liquidation;
pub mod price;
pub mod registry;
pub mod store;


pub use engine::{Collaborators, SynthUsdEngine};
pub use liquidation::LiquidationOutcome;
pub use store::{LedgerStore, LedgerView};
