//! Core Types for the SynthUSD Engine
//!
//! Addresses, price rounds and ledger snapshots shared by the engine and its
//! collaborators.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Type alias for account and contract addresses (32 bytes)
pub type Address = [u8; 32];

/// Type alias for collateral asset identifiers
pub type AssetId = Address;

/// Type alias for price feed identifiers
pub type FeedId = Address;

/// The zero address, never a valid account
pub const ZERO_ADDRESS: Address = [0u8; 32];

/// Returns true for the zero address
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}

/// Derives a deterministic address from a human-readable label
pub fn address_from_label(label: &str) -> Address {
    Sha256::digest(label.as_bytes()).into()
}

/// Short hex rendering for log fields
pub fn short_hex(address: &Address) -> String {
    hex::encode(&address[..6])
}

/// Parses a 32-byte hex address, with or without a `0x` prefix
pub fn parse_address(text: &str) -> Option<Address> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = hex::decode(digits).ok()?;
    bytes.try_into().ok()
}

// ============ Oracle Types ============

/// A price round as reported by an aggregator-style feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PriceRound {
    /// Round identifier
    pub round_id: u64,
    /// Price in USD with 8 decimals (e.g. 2000_00000000 = $2,000)
    pub answer: i128,
    /// Unix time the round started
    pub started_at: u64,
    /// Unix time the answer was last updated
    pub updated_at: u64,
    /// Round in which the answer was computed
    pub answered_in_round: u64,
}

impl PriceRound {
    /// Creates a complete round answered in itself
    pub fn new(round_id: u64, answer: i128, updated_at: u64) -> Self {
        Self {
            round_id,
            answer,
            started_at: updated_at,
            updated_at,
            answered_in_round: round_id,
        }
    }

    /// Returns true if the round has an answer computed in the current round
    pub fn is_complete(&self) -> bool {
        self.updated_at != 0 && self.answered_in_round >= self.round_id
    }
}

// ============ Ledger Types ============

/// A single collateral balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CollateralEntry {
    /// Owning account
    pub account: Address,
    /// Collateral asset
    pub asset: AssetId,
    /// Deposited amount in the asset's smallest unit
    pub amount: u128,
}

/// A single liability balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LiabilityEntry {
    /// Owning account
    pub account: Address,
    /// Minted liability in token base units
    pub amount: u128,
}

/// Point-in-time copy of the engine ledger
///
/// Only nonzero positions are listed, ordered by account then asset, so two
/// snapshots compare equal exactly when the ledgers are indistinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LedgerSnapshot {
    /// Collateral positions
    pub collateral: Vec<CollateralEntry>,
    /// Liability positions
    pub liability: Vec<LiabilityEntry>,
}

impl LedgerSnapshot {
    /// Serialize snapshot to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize snapshot from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Liability and collateral value of one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountInformation {
    /// Outstanding liability
    pub total_minted: u128,
    /// Sum of collateral USD values (18 decimals)
    pub collateral_value_usd: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_label_is_deterministic() {
        assert_eq!(address_from_label("alice"), address_from_label("alice"));
        assert_ne!(address_from_label("alice"), address_from_label("bob"));
        assert!(!is_zero_address(&address_from_label("alice")));
    }

    #[test]
    fn test_parse_address() {
        let address = [0x11u8; 32];
        let text = hex::encode(address);

        assert_eq!(parse_address(&text), Some(address));
        assert_eq!(parse_address(&format!("0x{text}")), Some(address));
        assert_eq!(parse_address("0x1234"), None);
        assert_eq!(parse_address("not hex"), None);
    }

    #[test]
    fn test_price_round_completeness() {
        let round = PriceRound::new(3, 2000_00000000, 1_700_000_000);
        assert!(round.is_complete());

        let unanswered = PriceRound { answered_in_round: 2, ..round };
        assert!(!unanswered.is_complete());

        let never_updated = PriceRound { updated_at: 0, ..round };
        assert!(!never_updated.is_complete());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = LedgerSnapshot {
            collateral: vec![CollateralEntry { account: [1u8; 32], asset: [2u8; 32], amount: 10 }],
            liability: vec![LiabilityEntry { account: [1u8; 32], amount: 5 }],
        };

        let restored = LedgerSnapshot::from_bytes(&snapshot.to_bytes()).unwrap();
        assert_eq!(snapshot, restored);
    }
}
