//! Card effect descriptors and the catalog they are loaded from.

use std::collections::HashSet;
use std::sync::Arc;

use cashflow_core::error::DomainError;
use cashflow_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

use super::classification::ResidenceTable;

/// What a card does to the player's finances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Lower income from targeted assets, or add an expense if none apply.
    ReduceCashFlow,
    /// Raise income from targeted assets.
    IncreaseCashFlow,
    /// Offer a one-time sale against a permanent rent increase.
    ChoiceSellOrKeep,
    /// Lose businesses.
    RemoveBusiness,
    /// Lose real estate.
    RemoveRealEstate,
    /// Receive or pay a lump sum.
    OneTimeCash,
    /// Raise rent on owned real estate.
    IncreaseRentalIncome,
    /// A kind this build does not know; resolves as a no-op.
    #[serde(other)]
    Unknown,
}

/// Which asset categories a card looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetAssetKind {
    /// Real estate only.
    RealEstate,
    /// Businesses only.
    Business,
    /// Real estate and businesses.
    Both,
    /// Nothing.
    #[default]
    None,
}

/// Extra filter applied after the target kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConditionKind {
    /// No filter.
    #[default]
    None,
    /// Homes only.
    ResidentialOnly,
    /// Non-residential real estate only.
    CommercialOnly,
    /// The asset named by `specific_asset_name` only.
    SpecificAsset,
}

/// Immutable description of one card's financial consequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    /// Card identifier; also labels fallback expenses.
    pub id: String,
    /// Text shown on the card.
    #[serde(default)]
    pub display_text: String,
    /// What the card does.
    pub effect_kind: EffectKind,
    /// Asset categories considered.
    #[serde(default)]
    pub target_asset_kind: TargetAssetKind,
    /// Filter within the target categories.
    #[serde(default)]
    pub condition_kind: ConditionKind,
    /// Asset name used by `ConditionKind::SpecificAsset`.
    #[serde(default)]
    pub specific_asset_name: Option<String>,
    /// Monthly cash-flow change.
    #[serde(default)]
    pub cash_flow_amount: f64,
    /// Lump sum, signed.
    #[serde(default)]
    pub one_time_cash_amount: f64,
    /// Monthly rent increase per property.
    #[serde(default)]
    pub rental_increase_amount: f64,
    /// How many assets removal cards take.
    #[serde(default)]
    pub asset_count: u32,
    /// Button label for the sell option.
    #[serde(default)]
    pub sell_choice_label: Option<String>,
    /// Button label for the keep option.
    #[serde(default)]
    pub keep_choice_label: Option<String>,
}

impl EffectDescriptor {
    /// A descriptor with every optional field at its default.
    #[must_use]
    pub fn new(id: impl Into<String>, effect_kind: EffectKind) -> Self {
        Self {
            id: id.into(),
            display_text: String::new(),
            effect_kind,
            target_asset_kind: TargetAssetKind::None,
            condition_kind: ConditionKind::None,
            specific_asset_name: None,
            cash_flow_amount: 0.0,
            one_time_cash_amount: 0.0,
            rental_increase_amount: 0.0,
            asset_count: 0,
            sell_choice_label: None,
            keep_choice_label: None,
        }
    }

    /// Sets the target categories.
    #[must_use]
    pub fn targeting(mut self, target: TargetAssetKind) -> Self {
        self.target_asset_kind = target;
        self
    }

    /// Sets the condition.
    #[must_use]
    pub fn when(mut self, condition: ConditionKind) -> Self {
        self.condition_kind = condition;
        self
    }

    /// Restricts the card to one named asset.
    #[must_use]
    pub fn for_asset(mut self, name: impl Into<String>) -> Self {
        self.condition_kind = ConditionKind::SpecificAsset;
        self.specific_asset_name = Some(name.into());
        self
    }

    /// Sets `cash_flow_amount`.
    #[must_use]
    pub fn with_cash_flow(mut self, amount: f64) -> Self {
        self.cash_flow_amount = amount;
        self
    }

    /// Sets `one_time_cash_amount`.
    #[must_use]
    pub fn with_one_time_cash(mut self, amount: f64) -> Self {
        self.one_time_cash_amount = amount;
        self
    }

    /// Sets `rental_increase_amount`.
    #[must_use]
    pub fn with_rental_increase(mut self, amount: f64) -> Self {
        self.rental_increase_amount = amount;
        self
    }

    /// Sets `asset_count`.
    #[must_use]
    pub fn with_asset_count(mut self, count: u32) -> Self {
        self.asset_count = count;
        self
    }

    /// Whether resolving this card needs a sell/keep decision.
    #[must_use]
    pub fn is_choice(&self) -> bool {
        self.effect_kind == EffectKind::ChoiceSellOrKeep
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    cards: Vec<EffectDescriptor>,
    #[serde(default)]
    classification: Option<ResidenceTable>,
}

/// The static deck of effect cards plus the residence table they rely on.
#[derive(Debug, Clone)]
pub struct EffectCatalog {
    cards: Vec<Arc<EffectDescriptor>>,
    classification: ResidenceTable,
}

impl EffectCatalog {
    /// Builds a catalog from descriptors, using the default residence table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` on duplicate or empty card ids.
    pub fn from_descriptors(cards: Vec<EffectDescriptor>) -> Result<Self, DomainError> {
        Self::build(cards, ResidenceTable::default())
    }

    /// Parses a JSON catalog: `{ "cards": [...], "classification": {...} }`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if parsing fails or ids clash.
    pub fn from_json_str(source: &str) -> Result<Self, DomainError> {
        let file: CatalogFile = serde_json::from_str(source)
            .map_err(|e| DomainError::Configuration(format!("invalid card catalog JSON: {e}")))?;
        Self::build(file.cards, file.classification.unwrap_or_default())
    }

    /// Parses a YAML catalog with the same shape as the JSON one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if parsing fails or ids clash.
    pub fn from_yaml_str(source: &str) -> Result<Self, DomainError> {
        let file: CatalogFile = serde_yaml::from_str(source)
            .map_err(|e| DomainError::Configuration(format!("invalid card catalog YAML: {e}")))?;
        Self::build(file.cards, file.classification.unwrap_or_default())
    }

    fn build(
        cards: Vec<EffectDescriptor>,
        classification: ResidenceTable,
    ) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for card in &cards {
            if card.id.trim().is_empty() {
                return Err(DomainError::Configuration(
                    "card id must not be empty".to_owned(),
                ));
            }
            if !seen.insert(card.id.as_str()) {
                return Err(DomainError::Configuration(format!(
                    "duplicate card id: {}",
                    card.id
                )));
            }
        }

        Ok(Self {
            cards: cards.into_iter().map(Arc::new).collect(),
            classification,
        })
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the catalog has no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Looks a card up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<EffectDescriptor>> {
        self.cards.iter().find(|card| card.id == id).cloned()
    }

    /// Cards in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EffectDescriptor>> {
        self.cards.iter()
    }

    /// The residence table shipped with the catalog.
    #[must_use]
    pub fn classification(&self) -> &ResidenceTable {
        &self.classification
    }

    /// Draws a card uniformly at random.
    #[must_use]
    pub fn draw(&self, rng: &mut dyn DeterministicRng) -> Option<Arc<EffectDescriptor>> {
        let last = u32::try_from(self.cards.len().checked_sub(1)?).ok()?;
        let index = rng.next_u32_range(0, last) as usize;
        self.cards.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashflow_test_support::SequenceRng;

    const JSON_CATALOG: &str = r#"{
        "cards": [
            {
                "id": "tenant-damage",
                "display_text": "A tenant wrecked your flat.",
                "effect_kind": "ReduceCashFlow",
                "target_asset_kind": "RealEstate",
                "condition_kind": "ResidentialOnly",
                "cash_flow_amount": -150
            },
            {
                "id": "buyer-offer",
                "effect_kind": "ChoiceSellOrKeep",
                "one_time_cash_amount": 30000,
                "rental_increase_amount": 200,
                "sell_choice_label": "Sell",
                "keep_choice_label": "Keep"
            },
            {
                "id": "mystery",
                "effect_kind": "SummonDragon"
            }
        ]
    }"#;

    #[test]
    fn test_json_catalog_parses_with_defaults() {
        let catalog = EffectCatalog::from_json_str(JSON_CATALOG).unwrap();

        assert_eq!(catalog.len(), 3);
        let damage = catalog.get("tenant-damage").unwrap();
        assert_eq!(damage.effect_kind, EffectKind::ReduceCashFlow);
        assert_eq!(damage.condition_kind, ConditionKind::ResidentialOnly);
        assert!((damage.cash_flow_amount + 150.0).abs() < f64::EPSILON);
        assert_eq!(damage.asset_count, 0);

        let offer = catalog.get("buyer-offer").unwrap();
        assert!(offer.is_choice());
        assert_eq!(offer.target_asset_kind, TargetAssetKind::None);
        assert_eq!(offer.sell_choice_label.as_deref(), Some("Sell"));
    }

    #[test]
    fn test_unrecognized_kind_parses_as_unknown() {
        // Act
        let catalog = EffectCatalog::from_json_str(JSON_CATALOG).unwrap();

        // Assert
        assert_eq!(
            catalog.get("mystery").unwrap().effect_kind,
            EffectKind::Unknown
        );
    }

    #[test]
    fn test_yaml_catalog_carries_classification() {
        // Arrange
        let yaml = r"
cards:
  - id: rent-hike
    effect_kind: IncreaseRentalIncome
    condition_kind: ResidentialOnly
    rental_increase_amount: 200
classification:
  entries:
    Cottage: Residential
";

        // Act
        let catalog = EffectCatalog::from_yaml_str(yaml).unwrap();

        // Assert
        assert_eq!(catalog.len(), 1);
        assert!(catalog.classification().is_residential("Cottage"));
        assert!(!catalog.classification().is_residential("RealEstate03"));
    }

    #[test]
    fn test_missing_classification_uses_suffix_convention() {
        // Act
        let catalog = EffectCatalog::from_json_str(JSON_CATALOG).unwrap();

        // Assert
        assert!(catalog.classification().is_residential("RealEstate03"));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        // Act
        let result = EffectCatalog::from_descriptors(vec![
            EffectDescriptor::new("dup", EffectKind::OneTimeCash),
            EffectDescriptor::new("dup", EffectKind::OneTimeCash),
        ]);

        // Assert
        match result {
            Err(DomainError::Configuration(msg)) => assert!(msg.contains("dup")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        // Act
        let result = EffectCatalog::from_json_str("{ not json");

        // Assert
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    fn test_draw_uses_injected_rng() {
        let catalog = EffectCatalog::from_json_str(JSON_CATALOG).unwrap();
        let mut rng = SequenceRng::new(vec![1, 0]);

        assert_eq!(catalog.draw(&mut rng).unwrap().id, "buyer-offer");
        assert_eq!(catalog.draw(&mut rng).unwrap().id, "tenant-damage");
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn test_draw_from_empty_catalog_is_none() {
        let catalog = EffectCatalog::from_descriptors(Vec::new()).unwrap();
        let mut rng = SequenceRng::new(vec![0]);
        assert!(catalog.draw(&mut rng).is_none());
        assert_eq!(rng.consumed(), 0);
    }
}
