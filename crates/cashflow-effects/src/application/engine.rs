//! The effect rule engine.
//!
//! Turns a descriptor plus the acting player's inventory into concrete
//! ledger, inventory and cash mutations. It never panics: a missing player
//! or an inapplicable choice is logged and reported as an error value, and
//! an unknown effect kind resolves as [`EffectOutcome::Ignored`].

use std::sync::Arc;

use cashflow_core::error::DomainError;
use cashflow_ledger::domain::ledger::AssetCategory;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::application::targeting::{applicable_assets, rental_assets};
use crate::domain::classification::ResidenceTable;
use crate::domain::collaborators::{AssetWorld, Choice};
use crate::domain::descriptors::{EffectDescriptor, EffectKind};
use crate::domain::player::{OwnedAsset, Player, investment_income_label};

/// What resolving a card did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EffectOutcome {
    /// Income items with these labels were adjusted (possibly none).
    IncomeAdjusted {
        /// Adjusted labels, in inventory order.
        labels: Vec<String>,
    },
    /// No asset applied, so an expense was booked instead.
    FallbackExpense {
        /// Expense label (the card id).
        label: String,
        /// Monthly amount.
        amount: f64,
    },
    /// Liquid cash changed.
    CashAdjusted {
        /// Signed change.
        delta: f64,
    },
    /// Assets were removed from the inventory.
    AssetsRemoved {
        /// Removed names, in inventory order.
        names: Vec<String>,
    },
    /// The card needs a sell/keep decision before anything happens.
    ChoiceRequired,
    /// The card did nothing.
    Ignored,
}

/// Applies card effects to players.
#[derive(Clone)]
pub struct EffectEngine {
    table: ResidenceTable,
    world: Option<Arc<dyn AssetWorld>>,
}

impl std::fmt::Debug for EffectEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectEngine")
            .field("table", &self.table)
            .field("world", &self.world.is_some())
            .finish()
    }
}

impl EffectEngine {
    /// Creates an engine using `table` for residential conditions.
    #[must_use]
    pub fn new(table: ResidenceTable) -> Self {
        Self { table, world: None }
    }

    /// Wires the collaborator that destroys removed assets' entities.
    #[must_use]
    pub fn with_world(mut self, world: Arc<dyn AssetWorld>) -> Self {
        self.world = Some(world);
        self
    }

    /// Applies a card. Choice cards return [`EffectOutcome::ChoiceRequired`]
    /// and change nothing; use [`EffectEngine::resolve_choice`] for them.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingCollaborator` if `player` is `None`.
    #[instrument(skip_all, fields(card_id = %descriptor.id, kind = ?descriptor.effect_kind))]
    pub fn apply(
        &self,
        descriptor: &EffectDescriptor,
        player: Option<&mut Player>,
    ) -> Result<EffectOutcome, DomainError> {
        let player = require_player(player)?;

        let outcome = match descriptor.effect_kind {
            EffectKind::ReduceCashFlow => self.reduce_cash_flow(descriptor, player),
            EffectKind::IncreaseCashFlow => self.increase_cash_flow(descriptor, player),
            EffectKind::OneTimeCash => pay_cash(player, descriptor.one_time_cash_amount),
            EffectKind::IncreaseRentalIncome => {
                self.increase_rent(descriptor, player, descriptor.rental_increase_amount)
            }
            EffectKind::RemoveBusiness => {
                self.remove_assets(player, AssetCategory::Business, descriptor.asset_count)
            }
            EffectKind::RemoveRealEstate => {
                self.remove_assets(player, AssetCategory::RealEstate, descriptor.asset_count)
            }
            EffectKind::ChoiceSellOrKeep => EffectOutcome::ChoiceRequired,
            EffectKind::Unknown => {
                warn!("unrecognized effect kind, ignoring card");
                EffectOutcome::Ignored
            }
        };

        info!(player_id = %player.id, ?outcome, "card effect applied");
        Ok(outcome)
    }

    /// Executes one resolution of a sell-or-keep card.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::LogicConflict` if the card offers no choice and
    /// `DomainError::MissingCollaborator` if `player` is `None`.
    #[instrument(skip_all, fields(card_id = %descriptor.id, ?choice))]
    pub fn resolve_choice(
        &self,
        descriptor: &EffectDescriptor,
        player: Option<&mut Player>,
        choice: Choice,
    ) -> Result<EffectOutcome, DomainError> {
        if !descriptor.is_choice() {
            warn!("sell/keep chosen on a card without a choice");
            return Err(DomainError::LogicConflict(format!(
                "card {} offers no sell/keep choice",
                descriptor.id
            )));
        }
        let player = require_player(player)?;

        let outcome = match choice {
            Choice::Sell => pay_cash(player, descriptor.one_time_cash_amount),
            Choice::Keep => {
                self.increase_rent(descriptor, player, descriptor.rental_increase_amount)
            }
        };

        info!(player_id = %player.id, ?outcome, "card choice resolved");
        Ok(outcome)
    }

    fn reduce_cash_flow(
        &self,
        descriptor: &EffectDescriptor,
        player: &mut Player,
    ) -> EffectOutcome {
        let amount = descriptor.cash_flow_amount.abs();
        let labels = names_of(&applicable_assets(player, descriptor, &self.table));

        if labels.is_empty() {
            if !player.ledger_mut().add_expense(&descriptor.id, amount) {
                debug!(amount, "fallback expense rejected by the ledger");
                return EffectOutcome::Ignored;
            }
            return EffectOutcome::FallbackExpense {
                label: descriptor.id.clone(),
                amount,
            };
        }

        adjust_each(player, labels, -amount)
    }

    fn increase_cash_flow(
        &self,
        descriptor: &EffectDescriptor,
        player: &mut Player,
    ) -> EffectOutcome {
        let labels = names_of(&applicable_assets(player, descriptor, &self.table));
        adjust_each(player, labels, descriptor.cash_flow_amount)
    }

    fn increase_rent(
        &self,
        descriptor: &EffectDescriptor,
        player: &mut Player,
        increase: f64,
    ) -> EffectOutcome {
        let labels = names_of(&rental_assets(player, descriptor, &self.table));
        adjust_each(player, labels, increase)
    }

    fn remove_assets(
        &self,
        player: &mut Player,
        category: AssetCategory,
        count: u32,
    ) -> EffectOutcome {
        let doomed: Vec<OwnedAsset> = player
            .assets_in(category)
            .take(count as usize)
            .cloned()
            .collect();

        let mut names = Vec::with_capacity(doomed.len());
        for asset in doomed {
            let ledger = player.ledger_mut();
            ledger.remove_income(&asset.name);
            let investment_label = investment_income_label(&asset.name);
            while ledger.remove_income(&investment_label) {}

            player.release_asset(asset.handle);
            if let Some(world) = &self.world {
                world.destroy(&asset);
            } else {
                warn!(asset = %asset.name, "no asset world wired; entity not destroyed");
            }
            names.push(asset.name);
        }

        EffectOutcome::AssetsRemoved { names }
    }
}

fn require_player(player: Option<&mut Player>) -> Result<&mut Player, DomainError> {
    player.ok_or_else(|| {
        warn!("card effect resolved without a player");
        DomainError::MissingCollaborator("player".to_owned())
    })
}

fn names_of(assets: &[&OwnedAsset]) -> Vec<String> {
    assets.iter().map(|asset| asset.name.clone()).collect()
}

fn adjust_each(player: &mut Player, labels: Vec<String>, delta: f64) -> EffectOutcome {
    let ledger = player.ledger_mut();
    let labels = labels
        .into_iter()
        .filter(|label| ledger.adjust_income(label, delta).is_some())
        .collect();
    EffectOutcome::IncomeAdjusted { labels }
}

fn pay_cash(player: &mut Player, delta: f64) -> EffectOutcome {
    player.adjust_cash(delta);
    EffectOutcome::CashAdjusted { delta }
}
