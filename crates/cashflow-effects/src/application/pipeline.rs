//! Resolves a drawn card for a player, human or AI.
//!
//! AI players wait out a presentation delay before their decision is
//! committed, so whatever displays the card gets to show it. Human players
//! are asked through a [`ChoiceProvider`] when the card offers a choice.
//! The player lock is only held while the engine mutates state, never
//! across a wait.

use std::sync::Arc;
use std::time::Duration;

use cashflow_core::error::DomainError;
use cashflow_core::time::Timer;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::application::decision::{Decision, DecisionPolicy};
use crate::application::engine::{EffectEngine, EffectOutcome};
use crate::domain::collaborators::ChoiceProvider;
use crate::domain::descriptors::EffectDescriptor;
use crate::domain::player::Player;

/// Engine + AI policy + presentation delay.
pub struct CardEffectPipeline {
    engine: EffectEngine,
    policy: Arc<dyn DecisionPolicy>,
    timer: Arc<dyn Timer>,
    ai_delay: Duration,
}

impl std::fmt::Debug for CardEffectPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardEffectPipeline")
            .field("engine", &self.engine)
            .field("ai_delay", &self.ai_delay)
            .finish_non_exhaustive()
    }
}

impl CardEffectPipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        engine: EffectEngine,
        policy: Arc<dyn DecisionPolicy>,
        timer: Arc<dyn Timer>,
        ai_delay: Duration,
    ) -> Self {
        Self {
            engine,
            policy,
            timer,
            ai_delay,
        }
    }

    /// Resolves `descriptor` for `player`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingCollaborator` when a human player draws a
    /// choice card and no `chooser` is wired, plus any engine error.
    #[instrument(skip_all, fields(card_id = %descriptor.id))]
    pub async fn resolve(
        &self,
        descriptor: &EffectDescriptor,
        player: &Mutex<Player>,
        chooser: Option<&dyn ChoiceProvider>,
    ) -> Result<EffectOutcome, DomainError> {
        let is_ai = player.lock().await.is_ai;

        if is_ai {
            self.timer.sleep(self.ai_delay).await;
            let decision = self.policy.decide(descriptor);
            debug!(?decision, "AI decision committed");
            let mut guard = player.lock().await;
            return match decision {
                Decision::Confirm => self.engine.apply(descriptor, Some(&mut *guard)),
                Decision::Choose(choice) => {
                    self.engine
                        .resolve_choice(descriptor, Some(&mut *guard), choice)
                }
            };
        }

        if descriptor.is_choice() {
            let Some(chooser) = chooser else {
                warn!("human player drew a choice card but no choice provider is wired");
                return Err(DomainError::MissingCollaborator(
                    "choice provider".to_owned(),
                ));
            };
            let choice = chooser.choose(descriptor).await;
            let mut guard = player.lock().await;
            return self
                .engine
                .resolve_choice(descriptor, Some(&mut *guard), choice);
        }

        let mut guard = player.lock().await;
        self.engine.apply(descriptor, Some(&mut *guard))
    }
}
