//! Engine Configuration
//!
//! The asset registry and risk parameters are fixed when the engine is
//! constructed. Configuration is built in code or loaded from TOML:
//!
//! ```toml
//! engine_address = "0x0101...01"
//! collateral_assets = ["0x0202...02", "0x0303...03"]
//! price_feeds = ["0x0404...04", "0x0505...05"]
//!
//! [risk]
//! liquidation_threshold = 50
//! liquidation_bonus = 10
//!
//! [oracle]
//! price_timeout_secs = 10800
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{oracle::PRICE_TIMEOUT_SECS, risk};
use crate::errors::{EngineError, EngineResult};
use crate::types::{is_zero_address, short_hex, Address, AssetId, FeedId};

/// Risk parameters, percentages over `LIQUIDATION_PRECISION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParameters {
    /// Share of collateral value counted toward solvency
    pub liquidation_threshold: u64,
    /// Collateral bonus paid to liquidators
    pub liquidation_bonus: u64,
    /// Health factor gain a liquidation must achieve beyond a strict increase
    pub min_health_factor_improvement: u64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            liquidation_threshold: risk::LIQUIDATION_THRESHOLD,
            liquidation_bonus: risk::LIQUIDATION_BONUS,
            min_health_factor_improvement: risk::MIN_HEALTH_FACTOR_IMPROVEMENT,
        }
    }
}

/// Oracle hardening parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleGuard {
    /// Rounds older than this many seconds are rejected as stale
    pub price_timeout_secs: u64,
}

impl Default for OracleGuard {
    fn default() -> Self {
        Self {
            price_timeout_secs: PRICE_TIMEOUT_SECS,
        }
    }
}

/// Construction-time engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Address the engine holds custody and token allowances under
    #[serde(with = "hex_address")]
    pub engine_address: Address,
    /// Collateral assets, in registry order
    #[serde(with = "hex_address_list")]
    pub collateral_assets: Vec<AssetId>,
    /// Price feed of each collateral asset, index-aligned with `collateral_assets`
    #[serde(with = "hex_address_list")]
    pub price_feeds: Vec<FeedId>,
    /// Risk parameters
    #[serde(default)]
    pub risk: RiskParameters,
    /// Oracle hardening
    #[serde(default)]
    pub oracle: OracleGuard,
}

impl EngineConfig {
    /// Creates a configuration with default risk and oracle parameters
    pub fn new(engine_address: Address, collateral_assets: Vec<AssetId>, price_feeds: Vec<FeedId>) -> Self {
        Self {
            engine_address,
            collateral_assets,
            price_feeds,
            risk: RiskParameters::default(),
            oracle: OracleGuard::default(),
        }
    }

    /// Parses and validates a TOML configuration
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EngineError::ConfigParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file
    pub fn from_toml_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigParse {
            message: format!("{}: {e}", path.display()),
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(
            path = %path.display(),
            assets = config.collateral_assets.len(),
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// Serializes the configuration back to TOML
    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string(self).map_err(|e| EngineError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Checks the configuration before any engine state is created
    pub fn validate(&self) -> EngineResult<()> {
        // 1. Lists must pair up
        if self.collateral_assets.len() != self.price_feeds.len() {
            return Err(EngineError::ConfigLengthMismatch {
                assets: self.collateral_assets.len(),
                feeds: self.price_feeds.len(),
            });
        }

        // 2. No zero addresses
        if is_zero_address(&self.engine_address) {
            return Err(EngineError::InvalidAddress {
                reason: "engine address cannot be zero",
            });
        }
        if self.collateral_assets.iter().any(is_zero_address) {
            return Err(EngineError::InvalidAddress {
                reason: "collateral asset cannot be zero address",
            });
        }
        if self.price_feeds.iter().any(is_zero_address) {
            return Err(EngineError::InvalidAddress {
                reason: "price feed cannot be zero address",
            });
        }

        // 3. Each asset has exactly one feed
        let mut seen = BTreeSet::new();
        for asset in &self.collateral_assets {
            if !seen.insert(*asset) {
                return Err(EngineError::DuplicateAsset { asset: *asset });
            }
        }

        // 4. Risk parameters in range
        let precision = risk::LIQUIDATION_PRECISION;
        if self.risk.liquidation_threshold == 0 || self.risk.liquidation_threshold > precision {
            return Err(EngineError::InvalidParameter {
                param: "liquidation_threshold",
                reason: "must be within 1..=LIQUIDATION_PRECISION",
            });
        }
        if self.risk.liquidation_bonus >= precision {
            return Err(EngineError::InvalidParameter {
                param: "liquidation_bonus",
                reason: "must be below LIQUIDATION_PRECISION",
            });
        }
        if self.oracle.price_timeout_secs == 0 {
            return Err(EngineError::InvalidParameter {
                param: "price_timeout_secs",
                reason: "must be positive",
            });
        }

        Ok(())
    }

    /// Registered (asset, feed) pairs in registry order
    pub fn pairs(&self) -> impl Iterator<Item = (&AssetId, &FeedId)> {
        self.collateral_assets.iter().zip(self.price_feeds.iter())
    }

    /// Log-friendly summary of the registry
    pub fn describe(&self) -> Vec<String> {
        self.pairs()
            .map(|(asset, feed)| format!("{} -> {}", short_hex(asset), short_hex(feed)))
            .collect()
    }
}

/// Serde adapter for a single hex address
mod hex_address {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::{parse_address, Address};

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(address)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_address(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid 32-byte hex address '{text}'")))
    }
}

/// Serde adapter for a list of hex addresses
mod hex_address_list {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::{parse_address, Address};

    pub fn serialize<S: Serializer>(addresses: &[Address], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(addresses.len()))?;
        for address in addresses {
            seq.serialize_element(&format!("0x{}", hex::encode(address)))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Address>, D::Error> {
        let texts = Vec::<String>::deserialize(deserializer)?;
        texts
            .iter()
            .map(|text| {
                parse_address(text).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid 32-byte hex address '{text}'"))
                })
            })
            .collect()
    }
}
