//! The card deck as seen by the turn coordinator.
//!
//! Drawing a card raises the animating flag before the resolution task is
//! spawned, so a coordinator polling right after the token lands always
//! sees it. The flag drops once the effect has been applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cashflow_core::rng::DeterministicRng;
use cashflow_effects::application::engine::EffectOutcome;
use cashflow_effects::application::pipeline::CardEffectPipeline;
use cashflow_effects::domain::descriptors::EffectCatalog;
use cashflow_effects::domain::player::Player;
use cashflow_turn::domain::collaborators::CardCollaborator;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// One resolved card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRecord {
    /// Who drew it.
    pub player_id: Uuid,
    /// Card id.
    pub card_id: String,
    /// What it did.
    pub outcome: EffectOutcome,
}

/// Draws cards and resolves them in the background.
pub struct CardSystem {
    catalog: EffectCatalog,
    pipeline: CardEffectPipeline,
    rng: Mutex<Box<dyn DeterministicRng>>,
    animating: AtomicBool,
    resolved: Mutex<Vec<CardRecord>>,
}

impl std::fmt::Debug for CardSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardSystem")
            .field("cards", &self.catalog.len())
            .field("animating", &self.animating.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CardSystem {
    /// Creates a deck over `catalog`.
    #[must_use]
    pub fn new(
        catalog: EffectCatalog,
        pipeline: CardEffectPipeline,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        Self {
            catalog,
            pipeline,
            rng: Mutex::new(rng),
            animating: AtomicBool::new(false),
            resolved: Mutex::new(Vec::new()),
        }
    }

    /// Draws a card for `player` and resolves it on a spawned task. Returns
    /// `None` when the deck is empty.
    pub fn draw_for(
        self: &Arc<Self>,
        player: Arc<tokio::sync::Mutex<Player>>,
    ) -> Option<JoinHandle<()>> {
        let card = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.catalog.draw(&mut **rng)?
        };
        self.animating.store(true, Ordering::SeqCst);
        info!(card_id = %card.id, text = %card.display_text, "card drawn");

        let deck = Arc::clone(self);
        Some(tokio::spawn(async move {
            let player_id = player.lock().await.id;
            match deck.pipeline.resolve(&card, &player, None).await {
                Ok(outcome) => deck.record(CardRecord {
                    player_id,
                    card_id: card.id.clone(),
                    outcome,
                }),
                Err(e) => {
                    warn!(%player_id, card_id = %card.id, error = %e, "card could not be resolved");
                }
            }
            deck.animating.store(false, Ordering::SeqCst);
        }))
    }

    fn record(&self, record: CardRecord) {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Cards resolved so far, in order.
    #[must_use]
    pub fn resolved(&self) -> Vec<CardRecord> {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CardCollaborator for CardSystem {
    fn is_card_animating(&self) -> bool {
        self.animating.load(Ordering::SeqCst)
    }
}
