//! Engine Events
//!
//! Events are buffered while a call is staged and published only when the
//! call commits, so observers never see events of a rolled-back call.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{Address, AssetId};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    CollateralDeposited = 0x01,
    CollateralRedeemed = 0x02,
    LiabilityMinted = 0x03,
    LiabilityBurned = 0x04,
    LiquidationExecuted = 0x05,
}

/// Main event enum containing all engine events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum EngineEvent {
    /// Collateral moved into engine custody
    CollateralDeposited {
        account: Address,
        asset: AssetId,
        amount: u128,
    },

    /// Collateral left engine custody, by redemption (`from == to`) or seizure
    CollateralRedeemed {
        from: Address,
        to: Address,
        asset: AssetId,
        amount: u128,
    },

    /// Liability minted against collateral
    LiabilityMinted { account: Address, amount: u128 },

    /// Liability repaid; `payer` supplied the tokens that were destroyed
    LiabilityBurned {
        on_behalf_of: Address,
        payer: Address,
        amount: u128,
    },

    /// An undercollateralized position was liquidated
    LiquidationExecuted {
        liquidator: Address,
        target: Address,
        asset: AssetId,
        debt_covered: u128,
        collateral_seized: u128,
        starting_health_factor: u128,
        ending_health_factor: u128,
    },
}

impl EngineEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::CollateralDeposited { .. } => EventType::CollateralDeposited,
            Self::CollateralRedeemed { .. } => EventType::CollateralRedeemed,
            Self::LiabilityMinted { .. } => EventType::LiabilityMinted,
            Self::LiabilityBurned { .. } => EventType::LiabilityBurned,
            Self::LiquidationExecuted { .. } => EventType::LiquidationExecuted,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Append-only log of published events with a running digest
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<EngineEvent>,
    digest: [u8; 32],
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: EngineEvent) {
        let mut hasher = Sha256::new();
        hasher.update(self.digest);
        hasher.update(event.to_bytes());
        self.digest = hasher.finalize().into();
        self.events.push(event);
    }

    /// Emit a batch of events in order
    pub fn extend(&mut self, events: impl IntoIterator<Item = EngineEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Get all events
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&EngineEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Hash chain over every event emitted so far
    ///
    /// Two logs share a digest only if they hold the same events in the same order.
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
