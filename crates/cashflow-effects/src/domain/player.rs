//! The player entity: liquid cash, ledger and owned-asset inventory.

use cashflow_core::error::DomainError;
use cashflow_ledger::domain::ledger::{AssetCategory, Ledger};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Handle to an asset's game entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub Uuid);

/// One owned asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedAsset {
    /// Entity handle.
    pub handle: AssetHandle,
    /// Unique name; also the label of its income item.
    pub name: String,
    /// Category.
    pub category: AssetCategory,
}

/// Label of the auxiliary income items tied to `asset_name`.
#[must_use]
pub fn investment_income_label(asset_name: &str) -> String {
    format!("{asset_name} Investment Income")
}

/// A seat at the table.
#[derive(Debug)]
pub struct Player {
    /// Player identifier; also tags the ledger.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Whether card decisions are made by the AI policy.
    pub is_ai: bool,
    cash: f64,
    ledger: Ledger,
    assets: Vec<OwnedAsset>,
}

impl Player {
    /// Creates a player with an empty ledger.
    #[must_use]
    pub fn new(name: impl Into<String>, is_ai: bool, starting_cash: f64) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            name: name.into(),
            is_ai,
            cash: starting_cash,
            ledger: Ledger::new(id),
            assets: Vec::new(),
        }
    }

    /// Liquid cash.
    #[must_use]
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Adds `delta` (signed) to liquid cash.
    pub fn adjust_cash(&mut self, delta: f64) {
        if delta.is_finite() {
            self.cash += delta;
        } else {
            debug!(player_id = %self.id, "ignoring non-finite cash delta");
        }
    }

    /// The player's ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the ledger.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Owned assets in acquisition order.
    #[must_use]
    pub fn assets(&self) -> &[OwnedAsset] {
        &self.assets
    }

    /// Owned assets of one category, in acquisition order.
    pub fn assets_in(&self, category: AssetCategory) -> impl Iterator<Item = &OwnedAsset> {
        self.assets
            .iter()
            .filter(move |asset| asset.category == category)
    }

    /// Takes ownership of a new asset. A positive `monthly_income` becomes an
    /// income item labelled with the asset name.
    ///
    /// Returns `None` for empty or already-owned names.
    pub fn acquire_asset(
        &mut self,
        name: &str,
        category: AssetCategory,
        monthly_income: f64,
    ) -> Option<AssetHandle> {
        if name.is_empty() || self.assets.iter().any(|asset| asset.name == name) {
            debug!(player_id = %self.id, name, "asset already owned or unnamed");
            return None;
        }

        let handle = AssetHandle(Uuid::new_v4());
        self.assets.push(OwnedAsset {
            handle,
            name: name.to_owned(),
            category,
        });
        self.ledger.add_asset(category, name);
        if monthly_income > 0.0 {
            self.ledger.add_income(name, monthly_income);
        }
        Some(handle)
    }

    /// Adds an investment-income item for an owned asset.
    pub fn add_investment_income(&mut self, asset_name: &str, amount: f64) -> bool {
        if !self.assets.iter().any(|asset| asset.name == asset_name) {
            return false;
        }
        self.ledger
            .add_income(&investment_income_label(asset_name), amount)
    }

    /// Drops an asset from the inventory and the ledger's name set. Income
    /// items are left to the caller.
    pub fn release_asset(&mut self, handle: AssetHandle) -> Option<OwnedAsset> {
        let index = self.assets.iter().position(|asset| asset.handle == handle)?;
        let asset = self.assets.remove(index);
        self.ledger.remove_asset(asset.category, &asset.name);
        Some(asset)
    }

    /// Buys shares through the market mini-game.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `cost` is not positive or exceeds
    /// the player's cash.
    pub fn buy_shares(&mut self, symbol: &str, cost: f64) -> Result<(), DomainError> {
        if symbol.is_empty() || !cost.is_finite() || cost <= 0.0 {
            return Err(DomainError::Validation(format!(
                "invalid share purchase: {symbol:?} for {cost}"
            )));
        }
        if cost > self.cash {
            return Err(DomainError::Validation(format!(
                "insufficient cash for {symbol}: need {cost}, have {}",
                self.cash
            )));
        }
        self.cash -= cost;
        self.ledger.add_asset(AssetCategory::Stock, symbol);
        Ok(())
    }

    /// Sells a held share position through the market mini-game.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the symbol is not held or the
    /// proceeds are negative.
    pub fn sell_shares(&mut self, symbol: &str, proceeds: f64) -> Result<(), DomainError> {
        if !proceeds.is_finite() || proceeds < 0.0 {
            return Err(DomainError::Validation(format!(
                "invalid proceeds for {symbol}: {proceeds}"
            )));
        }
        if !self.ledger.remove_asset(AssetCategory::Stock, symbol) {
            return Err(DomainError::Validation(format!(
                "no {symbol} shares held by player {}",
                self.id
            )));
        }
        self.cash += proceeds;
        Ok(())
    }
}
