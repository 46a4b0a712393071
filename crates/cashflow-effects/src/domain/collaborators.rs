//! Contracts the effect engine needs from the rest of the game.

use async_trait::async_trait;

use super::descriptors::EffectDescriptor;
use super::player::OwnedAsset;

/// The two resolutions of a sell-or-keep card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Take the one-time cash payment.
    Sell,
    /// Keep the property and take the rent increase.
    Keep,
}

/// Owner of the game entities behind assets (board pieces, models).
pub trait AssetWorld: Send + Sync {
    /// Destroys the entity behind `asset`. Called after the ledger and
    /// inventory no longer reference it.
    fn destroy(&self, asset: &OwnedAsset);
}

/// Asks a human player to pick a resolution for a choice card.
#[async_trait]
pub trait ChoiceProvider: Send + Sync {
    /// Resolves once the player has picked.
    async fn choose(&self, descriptor: &EffectDescriptor) -> Choice;
}
