//! SynthUSD Common Library
//!
//! Shared types, constants, and utilities for the SynthUSD engine and its
//! collaborators.
//!
//! ## Model
//!
//! Accounts lock collateral assets and mint a dollar-pegged liability token
//! against the USD value of that collateral. A position is solvent while its
//! health factor stays at or above [`constants::risk::MIN_HEALTH_FACTOR`].
//!
//! - **Fixed point**: all amounts carry 18 decimals, oracle prices carry 8
//! - **Collaborators**: price oracle, collateral tokens and the liability token
//!   are reached only through the traits in [`collaborators`]
//! - **Events**: every committed state change is published as an [`EngineEvent`]
//! - **Configuration**: [`EngineConfig`] is built in code or loaded from TOML

pub mod collaborators;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod math;
pub mod types;

pub use collaborators::*;
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use events::*;
pub use math::*;
pub use types::*;
