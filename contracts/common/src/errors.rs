//! Error Types for the SynthUSD Engine
//!
//! Every failed call surfaces exactly one of these errors and leaves the
//! ledger and all token balances as they were before the call.

use thiserror::Error;

use crate::types::Address;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Main error enum for all engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    // ============ Validation Errors ============
    /// Amount must be greater than zero
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// Asset is not registered as collateral
    #[error("asset {} is not registered as collateral", hex::encode(.asset))]
    UnknownAsset { asset: Address },

    /// Collateral asset and price feed lists differ in length
    #[error("{assets} collateral assets configured against {feeds} price feeds")]
    ConfigLengthMismatch { assets: usize, feeds: usize },

    /// Asset appears more than once in the configuration
    #[error("asset {} is configured more than once", hex::encode(.asset))]
    DuplicateAsset { asset: Address },

    /// Zero address supplied where a real account is required
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: &'static str },

    /// Risk or oracle parameter out of range
    #[error("invalid parameter {param}: {reason}")]
    InvalidParameter { param: &'static str, reason: &'static str },

    /// Configuration text could not be parsed
    #[error("configuration could not be parsed: {message}")]
    ConfigParse { message: String },

    /// Account holds less collateral than requested
    #[error("insufficient collateral balance: available {available}, requested {requested}")]
    InsufficientBalance { available: u128, requested: u128 },

    /// Burn exceeds the account's outstanding liability
    #[error("burn of {requested} exceeds outstanding liability {liability}")]
    BurnExceedsLiability { liability: u128, requested: u128 },

    // ============ External Call Errors ============
    /// Collateral or liability token transfer refused
    #[error("transfer of {amount} from {} to {} failed", hex::encode(.from), hex::encode(.to))]
    TransferFailed { from: Address, to: Address, amount: u128 },

    /// Liability token refused to mint
    #[error("liability token refused to mint {amount} to {}", hex::encode(.to))]
    MintFailed { to: Address, amount: u128 },

    /// Liability token refused to destroy tokens held by the engine
    #[error("liability token refused to burn {amount}")]
    BurnFailed { amount: u128 },

    // ============ Invariant Errors ============
    /// Health factor would fall below the minimum
    #[error("operation breaks health factor: {health_factor}")]
    BreaksHealthFactor { health_factor: u128 },

    /// Target position is solvent and cannot be liquidated
    #[error("health factor {health_factor} is not below the minimum")]
    HealthFactorOk { health_factor: u128 },

    /// Liquidation did not raise the target's health factor enough
    #[error("health factor not improved: {starting} -> {ending}")]
    HealthFactorNotImproved { starting: u128, ending: u128 },

    /// Target holds less of the chosen asset than the liquidation seizes
    #[error("insufficient collateral to seize: available {available}, required {required}")]
    InsufficientCollateral { available: u128, required: u128 },

    // ============ Reentrancy ============
    /// A balance-mutating call was entered while another is in flight
    #[error("reentrant call rejected")]
    ReentrantCall,

    // ============ Oracle Errors ============
    /// Oracle returned a zero or negative price
    #[error("oracle price {answer} for feed {} is not positive", hex::encode(.feed))]
    InvalidPrice { feed: Address, answer: i128 },

    /// Oracle round is older than the configured timeout or incomplete
    #[error("oracle round for feed {} is stale (updated at {updated_at}, now {now})", hex::encode(.feed))]
    StalePrice { feed: Address, updated_at: u64, now: u64 },

    /// Oracle has no round for the feed
    #[error("oracle has no price for feed {}", hex::encode(.feed))]
    OracleUnavailable { feed: Address },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,
}

/// Error classes used for logging and client handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any state was touched
    Validation,
    /// Bad or missing configuration
    Configuration,
    /// A collaborator refused an interaction
    ExternalCall,
    /// A solvency invariant would be violated
    Invariant,
    /// Re-entry into an in-flight call
    Reentrancy,
    /// Oracle data rejected
    Oracle,
    /// Fixed-point arithmetic failure
    Arithmetic,
}

impl EngineError {
    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "E001_ZERO_AMOUNT",
            Self::UnknownAsset { .. } => "E002_UNKNOWN_ASSET",
            Self::ConfigLengthMismatch { .. } => "E003_CONFIG_LENGTH",
            Self::DuplicateAsset { .. } => "E004_DUPLICATE_ASSET",
            Self::InvalidAddress { .. } => "E005_INVALID_ADDRESS",
            Self::InvalidParameter { .. } => "E006_INVALID_PARAM",
            Self::ConfigParse { .. } => "E007_CONFIG_PARSE",
            Self::InsufficientBalance { .. } => "E010_INSUFFICIENT_BALANCE",
            Self::BurnExceedsLiability { .. } => "E011_BURN_EXCEEDS_LIABILITY",
            Self::TransferFailed { .. } => "E020_TRANSFER_FAILED",
            Self::MintFailed { .. } => "E021_MINT_FAILED",
            Self::BurnFailed { .. } => "E022_BURN_FAILED",
            Self::BreaksHealthFactor { .. } => "E030_BREAKS_HEALTH_FACTOR",
            Self::HealthFactorOk { .. } => "E031_HEALTH_FACTOR_OK",
            Self::HealthFactorNotImproved { .. } => "E032_HEALTH_NOT_IMPROVED",
            Self::InsufficientCollateral { .. } => "E033_INSUFFICIENT_COLL",
            Self::ReentrantCall => "E040_REENTRANT",
            Self::InvalidPrice { .. } => "E050_INVALID_PRICE",
            Self::StalePrice { .. } => "E051_STALE_PRICE",
            Self::OracleUnavailable { .. } => "E052_ORACLE_UNAVAILABLE",
            Self::Overflow => "E060_OVERFLOW",
            Self::DivisionByZero => "E061_DIV_ZERO",
        }
    }

    /// Classifies the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount
            | Self::UnknownAsset { .. }
            | Self::InvalidAddress { .. }
            | Self::InsufficientBalance { .. }
            | Self::BurnExceedsLiability { .. } => ErrorKind::Validation,
            Self::ConfigLengthMismatch { .. }
            | Self::DuplicateAsset { .. }
            | Self::InvalidParameter { .. }
            | Self::ConfigParse { .. } => ErrorKind::Configuration,
            Self::TransferFailed { .. } | Self::MintFailed { .. } | Self::BurnFailed { .. } => {
                ErrorKind::ExternalCall
            }
            Self::BreaksHealthFactor { .. }
            | Self::HealthFactorOk { .. }
            | Self::HealthFactorNotImproved { .. }
            | Self::InsufficientCollateral { .. } => ErrorKind::Invariant,
            Self::ReentrantCall => ErrorKind::Reentrancy,
            Self::InvalidPrice { .. } | Self::StalePrice { .. } | Self::OracleUnavailable { .. } => {
                ErrorKind::Oracle
            }
            Self::Overflow | Self::DivisionByZero => ErrorKind::Arithmetic,
        }
    }

    /// Returns true if the caller can fix the error and retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::BreaksHealthFactor { .. } => true, // Add collateral or mint less
            Self::InsufficientBalance { .. } => true,
            Self::TransferFailed { .. } => true, // Approve or fund the account
            Self::StalePrice { .. } => true,    // Wait for the next round
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            EngineError::ZeroAmount,
            EngineError::UnknownAsset { asset: [1u8; 32] },
            EngineError::ConfigLengthMismatch { assets: 2, feeds: 1 },
            EngineError::DuplicateAsset { asset: [1u8; 32] },
            EngineError::InvalidAddress { reason: "zero" },
            EngineError::InvalidParameter { param: "p", reason: "r" },
            EngineError::ConfigParse { message: String::new() },
            EngineError::InsufficientBalance { available: 0, requested: 1 },
            EngineError::BurnExceedsLiability { liability: 0, requested: 1 },
            EngineError::TransferFailed { from: [0u8; 32], to: [1u8; 32], amount: 1 },
            EngineError::MintFailed { to: [1u8; 32], amount: 1 },
            EngineError::BurnFailed { amount: 1 },
            EngineError::BreaksHealthFactor { health_factor: 0 },
            EngineError::HealthFactorOk { health_factor: 0 },
            EngineError::HealthFactorNotImproved { starting: 0, ending: 0 },
            EngineError::InsufficientCollateral { available: 0, required: 1 },
            EngineError::ReentrantCall,
            EngineError::InvalidPrice { feed: [2u8; 32], answer: 0 },
            EngineError::StalePrice { feed: [2u8; 32], updated_at: 0, now: 1 },
            EngineError::OracleUnavailable { feed: [2u8; 32] },
            EngineError::Overflow,
            EngineError::DivisionByZero,
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(EngineError::ZeroAmount.kind(), ErrorKind::Validation);
        assert_eq!(EngineError::ReentrantCall.kind(), ErrorKind::Reentrancy);
        assert_eq!(
            EngineError::HealthFactorOk { health_factor: 2 }.kind(),
            ErrorKind::Invariant
        );
        assert_eq!(EngineError::BurnFailed { amount: 1 }.kind(), ErrorKind::ExternalCall);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(EngineError::BreaksHealthFactor { health_factor: 1 }.is_recoverable());
        assert!(EngineError::StalePrice {
            feed: [1u8; 32],
            updated_at: 0,
            now: 1
        }
        .is_recoverable());
        assert!(!EngineError::ReentrantCall.is_recoverable());
        assert!(!EngineError::Overflow.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::UnknownAsset { asset: [0xab; 32] };
        assert!(err.to_string().starts_with("asset abab"));

        let err = EngineError::BreaksHealthFactor { health_factor: 42 };
        assert_eq!(err.to_string(), "operation breaks health factor: 42");
    }
}
