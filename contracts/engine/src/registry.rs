//! Asset Registry
//!
//! Collateral assets and their price feeds, fixed at construction.

use std::collections::BTreeMap;

use synthusd_common::{
    config::EngineConfig,
    errors::{EngineError, EngineResult},
    types::{AssetId, FeedId},
};

/// Registered collateral assets in configuration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRegistry {
    assets: Vec<AssetId>,
    feeds: BTreeMap<AssetId, FeedId>,
}

impl AssetRegistry {
    /// Builds the registry from a validated configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            assets: config.collateral_assets.clone(),
            feeds: config.pairs().map(|(asset, feed)| (*asset, *feed)).collect(),
        }
    }

    /// Price feed of `asset`, rejecting unregistered assets
    pub fn feed_of(&self, asset: &AssetId) -> EngineResult<FeedId> {
        self.feeds
            .get(asset)
            .copied()
            .ok_or(EngineError::UnknownAsset { asset: *asset })
    }

    pub fn ensure_registered(&self, asset: &AssetId) -> EngineResult<()> {
        self.feed_of(asset).map(|_| ())
    }

    pub fn price_feed(&self, asset: &AssetId) -> Option<FeedId> {
        self.feeds.get(asset).copied()
    }

    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    /// (asset, feed) pairs in configuration order
    pub fn pairs(&self) -> impl Iterator<Item = (&AssetId, &FeedId)> + '_ {
        self.assets
            .iter()
            .filter_map(move |asset| self.feeds.get(asset).map(|feed| (asset, feed)))
    }
}
