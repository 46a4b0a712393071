//! Resolves which owned assets a card applies to.

use cashflow_ledger::domain::ledger::AssetCategory;

use crate::domain::classification::ResidenceTable;
use crate::domain::descriptors::{ConditionKind, EffectDescriptor, TargetAssetKind};
use crate::domain::player::{OwnedAsset, Player};

fn in_target(target: TargetAssetKind, category: AssetCategory) -> bool {
    match target {
        TargetAssetKind::RealEstate => category == AssetCategory::RealEstate,
        TargetAssetKind::Business => category == AssetCategory::Business,
        TargetAssetKind::Both => {
            matches!(
        category,
        AssetCategory::RealEstate | AssetCategory::Business
    )
        }
        TargetAssetKind::None => false,
    }
}

/// Assets matching the card's target kind and condition, in inventory order.
#[must_use]
pub fn applicable_assets<'a>(
    player: &'a Player,
    descriptor: &EffectDescriptor,
    table: &ResidenceTable,
) -> Vec<&'a OwnedAsset> {
    player
        .assets()
        .iter()
        .filter(|asset| in_target(descriptor.target_asset_kind, asset.category))
        .filter(|asset| match descriptor.condition_kind {
            ConditionKind::None => true,
            ConditionKind::SpecificAsset => {
                descriptor.specific_asset_name.as_deref() == Some(asset.name.as_str())
            }
            ConditionKind::ResidentialOnly => {
                asset.category == AssetCategory::RealEstate && table.is_residential(&asset.name)
            }
            ConditionKind::CommercialOnly => {
                asset.category == AssetCategory::RealEstate && !table.is_residential(&asset.name)
            }
        })
        .collect()
}

/// Real estate a rent increase applies to: every owned property, or only
/// homes when the card is residential-only. Other conditions are ignored.
#[must_use]
pub fn rental_assets<'a>(
    player: &'a Player,
    descriptor: &EffectDescriptor,
    table: &ResidenceTable,
) -> Vec<&'a OwnedAsset> {
    let residential_only = descriptor.condition_kind == ConditionKind::ResidentialOnly;
    player
        .assets_in(AssetCategory::RealEstate)
        .filter(|asset| !residential_only || table.is_residential(&asset.name))
        .collect()
}
