//! The turn coordinator.
//!
//! Turns the independently timed dice, token and card subsystems into one
//! strict sequence:
//!
//! `Idle → Rolling → AwaitingSettle → Resolving → AwaitingMovement →
//! AwaitingCardEffect → Respawning → Idle`
//!
//! Every wait is a suspension on the injected [`Timer`] or on the movement
//! collaborator, so the coordinator never blocks the thread. A roll trigger
//! is only accepted from `Idle` with no token moving, no card animating and
//! no mini-game holding focus.

use std::sync::Arc;

use cashflow_core::config::{DebugOverride, GameConfig, TimingConfig};
use cashflow_core::error::DomainError;
use cashflow_core::event::EventMetadata;
use cashflow_core::time::{Clock, Timer};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::collaborators::{CardCollaborator, FocusGuard, MovementCollaborator};
use crate::domain::dice::DiceSubsystem;
use crate::domain::events::{TurnEvent, TurnEventKind};
use crate::domain::turn::{TurnContext, TurnPhase, movement_steps};

/// Result of a completed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The finished turn.
    pub turn_id: Uuid,
    /// Faces the dice settled on.
    pub faces: [u8; 2],
    /// Spaces the token moved.
    pub movement_steps: u32,
}

/// Sequences one player's turns.
pub struct TurnCoordinator {
    player_id: Uuid,
    dice: Box<dyn DiceSubsystem>,
    movement: Option<Arc<dyn MovementCollaborator>>,
    cards: Option<Arc<dyn CardCollaborator>>,
    focus: Option<Arc<dyn FocusGuard>>,
    timer: Arc<dyn Timer>,
    clock: Arc<dyn Clock>,
    timing: TimingConfig,
    debug: DebugOverride,
    context: Option<TurnContext>,
    sequence: i64,
    journal: Vec<TurnEvent>,
}

impl std::fmt::Debug for TurnCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnCoordinator")
            .field("player_id", &self.player_id)
            .field("context", &self.context)
            .field("timing", &self.timing)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl TurnCoordinator {
    /// Creates a coordinator for `player_id` and puts a pair of dice on the
    /// board. Collaborators are attached with the `with_*` methods.
    #[must_use]
    pub fn new(
        player_id: Uuid,
        mut dice: Box<dyn DiceSubsystem>,
        timer: Arc<dyn Timer>,
        clock: Arc<dyn Clock>,
        config: &GameConfig,
    ) -> Self {
        if !dice.is_spawned() {
            dice.spawn();
        }
        Self {
            player_id,
            dice,
            movement: None,
            cards: None,
            focus: None,
            timer,
            clock,
            timing: config.timing,
            debug: config.debug,
            context: None,
            sequence: 0,
            journal: Vec::new(),
        }
    }

    /// Attaches the player token's mover.
    #[must_use]
    pub fn with_movement(mut self, movement: Arc<dyn MovementCollaborator>) -> Self {
        self.movement = Some(movement);
        self
    }

    /// Attaches the card system.
    #[must_use]
    pub fn with_cards(mut self, cards: Arc<dyn CardCollaborator>) -> Self {
        self.cards = Some(cards);
        self
    }

    /// Attaches a focus guard for exclusive mini-activities.
    #[must_use]
    pub fn with_focus(mut self, focus: Arc<dyn FocusGuard>) -> Self {
        self.focus = Some(focus);
        self
    }

    /// Current phase; `Idle` when no turn is in flight.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.context.as_ref().map_or(TurnPhase::Idle, |c| c.phase)
    }

    /// The turn in flight, if any.
    #[must_use]
    pub fn context(&self) -> Option<&TurnContext> {
        self.context.as_ref()
    }

    /// Whether a fresh pair of dice is waiting for the next roll.
    #[must_use]
    pub fn dice_ready(&self) -> bool {
        self.dice.is_spawned()
    }

    /// Drains the journal.
    pub fn take_events(&mut self) -> Vec<TurnEvent> {
        std::mem::take(&mut self.journal)
    }

    /// Accepts a roll trigger and moves to `Rolling`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::LogicConflict` when a turn is already in flight,
    /// a card is animating, the token is moving or a mini-game holds focus.
    /// Nothing changes when the trigger is rejected.
    pub fn begin_turn(&mut self) -> Result<Uuid, DomainError> {
        if let Some(reason) = self.blocking_reason() {
            warn!(
                player_id = %self.player_id,
                phase = %self.phase(),
                reason,
                "roll trigger rejected"
            );
            return Err(DomainError::LogicConflict(reason.to_owned()));
        }

        let context = TurnContext::start();
        let turn_id = context.turn_id;
        self.context = Some(context);
        self.record(TurnEventKind::Started {
            player_id: self.player_id,
        });
        info!(player_id = %self.player_id, %turn_id, "turn started");
        Ok(turn_id)
    }

    /// Runs the accepted turn to completion.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::LogicConflict` if no turn was begun, or the
    /// error that aborted the turn. An aborted turn still leaves the
    /// coordinator `Idle` with fresh dice.
    #[instrument(skip(self), fields(player_id = %self.player_id))]
    pub async fn drive_turn(&mut self) -> Result<TurnOutcome, DomainError> {
        let Some(turn_id) = self
            .context
            .as_ref()
            .filter(|c| c.phase == TurnPhase::Rolling)
            .map(|c| c.turn_id)
        else {
            return Err(DomainError::LogicConflict(
                "no accepted roll to drive".to_owned(),
            ));
        };

        if let Err(e) = self.dice.roll() {
            return Err(self.abort(e));
        }
        self.set_phase(TurnPhase::AwaitingSettle);
        let mut settle_polls = 0_u32;
        loop {
            self.timer.sleep(self.timing.settle_poll_interval).await;
            settle_polls += 1;
            if self.dice.poll_settled() {
                break;
            }
        }

        self.set_phase(TurnPhase::Resolving);
        let Some(faces) = self.dice.take_faces() else {
            let missing = DomainError::MissingCollaborator("dice".to_owned());
            return Err(self.abort(missing));
        };
        let dice_sum = u32::from(faces[0]) + u32::from(faces[1]);
        let steps = movement_steps(faces, self.debug);
        if let Some(context) = self.context.as_mut() {
            context.faces = Some(faces);
            context.dice_sum = dice_sum;
            context.movement_steps = steps;
        }
        self.record(TurnEventKind::DiceSettled {
            faces,
            dice_sum,
            settle_polls,
        });
        info!(%turn_id, ?faces, dice_sum, steps, "dice settled");
        self.timer.sleep(self.timing.result_display_interval).await;

        self.set_phase(TurnPhase::AwaitingMovement);
        let Some(movement) = self.movement.clone() else {
            return Err(self.abort(DomainError::MissingCollaborator(
                "player token".to_owned(),
            )));
        };
        self.record(TurnEventKind::MovementStarted { steps });
        if let Err(e) = movement.move_steps(steps).await {
            return Err(self.abort(e));
        }
        self.record(TurnEventKind::MovementCompleted { steps });

        self.set_phase(TurnPhase::AwaitingCardEffect);
        if let Some(cards) = self.cards.clone() {
            let mut polls = 0_u32;
            while cards.is_card_animating() {
                self.timer.sleep(self.timing.card_poll_interval).await;
                polls += 1;
            }
            if polls > 0 {
                self.record(TurnEventKind::CardEffectAwaited { polls });
            }
        } else {
            debug!(%turn_id, "no card system attached");
        }

        self.set_phase(TurnPhase::Respawning);
        self.dice.spawn();
        self.record(TurnEventKind::Completed {
            movement_steps: steps,
        });
        self.context = None;
        info!(%turn_id, steps, "turn completed");

        Ok(TurnOutcome {
            turn_id,
            faces,
            movement_steps: steps,
        })
    }

    /// Accepts a roll trigger and runs the turn.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_turn`] and [`Self::drive_turn`].
    pub async fn request_roll(&mut self) -> Result<TurnOutcome, DomainError> {
        self.begin_turn()?;
        self.drive_turn().await
    }

    fn blocking_reason(&self) -> Option<&'static str> {
        if self.context.is_some() {
            return Some("a turn is already in flight");
        }
        if self.cards.as_ref().is_some_and(|c| c.is_card_animating()) {
            return Some("a card is still animating");
        }
        if self.movement.as_ref().is_some_and(|m| m.is_moving()) {
            return Some("the token is still moving");
        }
        if self.focus.as_ref().is_some_and(|f| f.holds_focus()) {
            return Some("a mini-game holds focus");
        }
        None
    }

    fn set_phase(&mut self, phase: TurnPhase) {
        if let Some(context) = self.context.as_mut() {
            debug!(turn_id = %context.turn_id, from = %context.phase, to = %phase, "phase change");
            context.phase = phase;
        }
    }

    fn record(&mut self, kind: TurnEventKind) {
        let Some(context) = self.context.as_ref() else {
            return;
        };
        let metadata = EventMetadata::stamped(
            kind.event_type(),
            context.turn_id,
            self.sequence,
            context.correlation_id,
            self.clock.as_ref(),
        );
        self.sequence += 1;
        self.journal.push(TurnEvent { metadata, kind });
    }

    fn abort(&mut self, error: DomainError) -> DomainError {
        let turn_id = self.context.as_ref().map(|c| c.turn_id);
        warn!(?turn_id, phase = %self.phase(), %error, "turn aborted");
        self.record(TurnEventKind::Aborted {
            reason: error.to_string(),
        });
        self.dice.spawn();
        self.context = None;
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use cashflow_core::event::DomainEvent;
    use cashflow_test_support::{InstantTimer, MockRng, SequenceRng, fixed_clock};

    use crate::domain::dice::SimulatedDice;

    /// Animates for a set number of checks after each landing.
    #[derive(Default)]
    struct CountdownCards {
        remaining: AtomicU32,
    }

    impl CountdownCards {
        fn draw(&self, polls: u32) {
            self.remaining.store(polls, Ordering::SeqCst);
        }
    }

    impl CardCollaborator for CountdownCards {
        fn is_card_animating(&self) -> bool {
            self.remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    /// Records requested moves; lands on a card every time if attached.
    #[derive(Default)]
    struct RecordingMovement {
        moves: std::sync::Mutex<Vec<u32>>,
        moving: AtomicBool,
        card: Option<(Arc<CountdownCards>, u32)>,
    }

    #[async_trait]
    impl MovementCollaborator for RecordingMovement {
        async fn move_steps(&self, steps: u32) -> Result<(), DomainError> {
            self.moves.lock().unwrap().push(steps);
            if let Some((cards, polls)) = &self.card {
                cards.draw(*polls);
            }
            Ok(())
        }

        fn is_moving(&self) -> bool {
            self.moving.load(Ordering::SeqCst)
        }
    }

    struct Focus(AtomicBool);

    impl FocusGuard for Focus {
        fn holds_focus(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn coordinator(
        dice: SimulatedDice,
        timer: Arc<InstantTimer>,
        config: &GameConfig,
    ) -> TurnCoordinator {
        TurnCoordinator::new(
            Uuid::new_v4(),
            Box::new(dice),
            timer,
            Arc::new(fixed_clock()),
            config,
        )
    }

    fn scripted_dice(values: Vec<u32>) -> SimulatedDice {
        SimulatedDice::new(Box::new(SequenceRng::new(values)), 5)
    }

    fn event_types(events: &[TurnEvent]) -> Vec<&'static str> {
        events.iter().map(DomainEvent::event_type).collect()
    }

    #[tokio::test]
    async fn test_full_turn_moves_by_dice_sum() {
        // Arrange
        let timer = Arc::new(InstantTimer::new());
        let movement = Arc::new(RecordingMovement::default());
        let mut turns = coordinator(
            scripted_dice(vec![1, 1, 3, 5]),
            timer.clone(),
            &GameConfig::default(),
        )
        .with_movement(movement.clone());

        // Act
        let outcome = turns.request_roll().await.unwrap();

        // Assert
        assert_eq!(outcome.faces, [3, 5]);
        assert_eq!(outcome.movement_steps, 8);
        assert_eq!(*movement.moves.lock().unwrap(), vec![8]);
        assert_eq!(turns.phase(), TurnPhase::Idle);
        assert!(turns.context().is_none());
        assert!(turns.dice_ready());
        assert_eq!(
            timer.sleeps(),
            vec![Duration::from_millis(100), Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn test_debug_override_moves_fixed_steps() {
        // Arrange
        let config = GameConfig {
            debug: DebugOverride::fixed(1),
            ..GameConfig::default()
        };
        let movement = Arc::new(RecordingMovement::default());
        let mut turns = coordinator(
            scripted_dice(vec![1, 1, 3, 5]),
            Arc::new(InstantTimer::new()),
            &config,
        )
        .with_movement(movement.clone());

        // Act
        let outcome = turns.request_roll().await.unwrap();

        // Assert
        assert_eq!(outcome.faces, [3, 5]);
        assert_eq!(outcome.movement_steps, 1);
        assert_eq!(*movement.moves.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_settle_is_polled_every_interval_until_both_dice_stop() {
        // Arrange
        let timer = Arc::new(InstantTimer::new());
        let mut turns = coordinator(
            scripted_dice(vec![3, 2, 6, 4]),
            timer.clone(),
            &GameConfig::default(),
        )
        .with_movement(Arc::new(RecordingMovement::default()));

        // Act
        let outcome = turns.request_roll().await.unwrap();
        let events = turns.take_events();

        // Assert
        // die two settles first and draws its face first
        assert_eq!(outcome.faces, [4, 6]);
        assert_eq!(timer.count_of(Duration::from_millis(100)), 3);
        assert!(events.iter().any(|e| e.kind
            == TurnEventKind::DiceSettled {
                faces: [4, 6],
                dice_sum: 10,
                settle_polls: 3,
            }));
    }

    #[tokio::test]
    async fn test_second_trigger_while_in_flight_is_rejected_without_mutation() {
        // Arrange
        let mut turns = coordinator(
            SimulatedDice::new(Box::new(MockRng), 1),
            Arc::new(InstantTimer::new()),
            &GameConfig::default(),
        )
        .with_movement(Arc::new(RecordingMovement::default()));
        let turn_id = turns.begin_turn().unwrap();
        let before = turns.context().cloned();

        // Act
        let result = turns.request_roll().await;

        // Assert
        assert!(matches!(result, Err(DomainError::LogicConflict(_))));
        assert_eq!(turns.context().cloned(), before);
        assert_eq!(turns.phase(), TurnPhase::Rolling);
        assert_eq!(turns.take_events().len(), 1);

        let outcome = turns.drive_turn().await.unwrap();
        assert_eq!(outcome.turn_id, turn_id);
    }

    #[tokio::test]
    async fn test_trigger_rejected_while_token_moving_card_animating_or_focus_held() {
        let movement = Arc::new(RecordingMovement::default());
        let cards = Arc::new(CountdownCards::default());
        let focus = Arc::new(Focus(AtomicBool::new(false)));
        let mut turns = coordinator(
            SimulatedDice::new(Box::new(MockRng), 1),
            Arc::new(InstantTimer::new()),
            &GameConfig::default(),
        )
        .with_movement(movement.clone())
        .with_cards(cards.clone())
        .with_focus(focus.clone());

        movement.moving.store(true, Ordering::SeqCst);
        assert_eq!(
            turns.begin_turn(),
            Err(DomainError::LogicConflict(
                "the token is still moving".to_owned()
            ))
        );
        movement.moving.store(false, Ordering::SeqCst);

        focus.0.store(true, Ordering::SeqCst);
        assert_eq!(
            turns.begin_turn(),
            Err(DomainError::LogicConflict(
                "a mini-game holds focus".to_owned()
            ))
        );
        focus.0.store(false, Ordering::SeqCst);

        cards.draw(5);
        assert_eq!(
            turns.begin_turn(),
            Err(DomainError::LogicConflict(
                "a card is still animating".to_owned()
            ))
        );

        assert_eq!(turns.phase(), TurnPhase::Idle);
        assert!(turns.take_events().is_empty());
    }

    #[tokio::test]
    async fn test_drive_without_begin_is_a_logic_conflict() {
        let mut turns = coordinator(
            SimulatedDice::new(Box::new(MockRng), 1),
            Arc::new(InstantTimer::new()),
            &GameConfig::default(),
        );

        assert!(matches!(
            turns.drive_turn().await,
            Err(DomainError::LogicConflict(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_token_aborts_and_respawns_dice() {
        // Arrange
        let timer = Arc::new(InstantTimer::new());
        let mut turns = coordinator(
            SimulatedDice::new(Box::new(MockRng), 1),
            timer.clone(),
            &GameConfig::default(),
        );

        // Act
        let result = turns.request_roll().await;
        let events = turns.take_events();

        // Assert
        assert_eq!(
            result,
            Err(DomainError::MissingCollaborator("player token".to_owned()))
        );
        assert_eq!(turns.phase(), TurnPhase::Idle);
        assert!(turns.dice_ready());
        assert_eq!(
            event_types(&events),
            vec!["turn.started", "turn.dice_settled", "turn.aborted"]
        );
        assert_eq!(
            events[2].kind,
            TurnEventKind::Aborted {
                reason: "missing collaborator: player token".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_aborted_turn_does_not_block_the_next_roll() {
        // Arrange
        let mut turns = coordinator(
            SimulatedDice::new(Box::new(MockRng), 1),
            Arc::new(InstantTimer::new()),
            &GameConfig::default(),
        );
        assert!(turns.request_roll().await.is_err());

        // Act
        let mut turns = turns.with_movement(Arc::new(RecordingMovement::default()));
        let outcome = turns.request_roll().await.unwrap();

        // Assert
        assert_eq!(outcome.faces, [1, 1]);
        assert_eq!(outcome.movement_steps, 2);
    }

    #[tokio::test]
    async fn test_turn_waits_for_card_animation_before_completing() {
        // Arrange
        let timer = Arc::new(InstantTimer::new());
        let cards = Arc::new(CountdownCards::default());
        let movement = Arc::new(RecordingMovement {
            card: Some((cards.clone(), 4)),
            ..RecordingMovement::default()
        });
        let mut turns = coordinator(
            SimulatedDice::new(Box::new(MockRng), 1),
            timer.clone(),
            &GameConfig::default(),
        )
        .with_movement(movement)
        .with_cards(cards);

        // Act
        turns.request_roll().await.unwrap();
        let events = turns.take_events();

        // Assert
        assert_eq!(
            event_types(&events),
            vec![
                "turn.started",
                "turn.dice_settled",
                "turn.movement_started",
                "turn.movement_completed",
                "turn.card_effect_awaited",
                "turn.completed",
            ]
        );
        assert_eq!(
            events[4].kind,
            TurnEventKind::CardEffectAwaited { polls: 4 }
        );
        assert_eq!(timer.count_of(Duration::from_millis(100)), 1 + 4);
    }

    #[tokio::test]
    async fn test_journal_events_share_turn_and_correlation_ids_in_sequence() {
        // Arrange
        let mut turns = coordinator(
            SimulatedDice::new(Box::new(MockRng), 1),
            Arc::new(InstantTimer::new()),
            &GameConfig::default(),
        )
        .with_movement(Arc::new(RecordingMovement::default()));

        // Act
        let first = turns.request_roll().await.unwrap();
        let second = turns.request_roll().await.unwrap();
        let events = turns.take_events();

        // Assert
        assert_ne!(first.turn_id, second.turn_id);
        let sequence: Vec<i64> = events
            .iter()
            .map(|e| e.metadata.sequence_number)
            .collect();
        assert_eq!(sequence, (0..10).collect::<Vec<_>>());
        let first_turn: Vec<&TurnEvent> = events
            .iter()
            .filter(|e| e.metadata.aggregate_id == first.turn_id)
            .collect();
        assert_eq!(first_turn.len(), 5);
        let correlation_id = first_turn[0].metadata.correlation_id;
        assert!(
            first_turn
                .iter()
                .all(|e| e.metadata.correlation_id == correlation_id)
        );
        assert!(
            events
                .iter()
                .all(|e| e.metadata.occurred_at == fixed_clock().0)
        );
        assert!(turns.take_events().is_empty());
    }
}
