//! Game state and the round loop.

use std::sync::Arc;

use cashflow_core::config::{GameConfig, TimingConfig};
use cashflow_core::error::DomainError;
use cashflow_core::rng::{DeterministicRng, SeededRng};
use cashflow_core::time::{Clock, Timer};
use cashflow_effects::application::decision::PaybackPolicy;
use cashflow_effects::application::engine::EffectEngine;
use cashflow_effects::application::pipeline::CardEffectPipeline;
use cashflow_effects::domain::descriptors::EffectCatalog;
use cashflow_effects::domain::player::Player;
use cashflow_ledger::application::query_handlers::{LedgerView, ledger_view};
use cashflow_ledger::domain::events::{CashFlowChanged, CashFlowObserver, ChannelObserver};
use cashflow_turn::application::coordinator::TurnCoordinator;
use cashflow_turn::domain::collaborators::{CardCollaborator, FocusGuard};
use cashflow_turn::domain::dice::SimulatedDice;
use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::board::Board;
use crate::cards::{CardRecord, CardSystem};
use crate::deeds::Deeds;
use crate::market::StockMarket;
use crate::movement::BoardMovement;

/// Seats used by the binary.
pub const DEFAULT_SEATS: [&str; 3] = ["Avery", "Blake", "Casey"];

/// Cash each seat starts with.
pub const STARTING_CASH: f64 = 5000.0;

/// Most settle checks a die needs.
pub const MAX_SETTLE_POLLS: u32 = 5;

const MAX_TRIGGER_ATTEMPTS: u32 = 200;

const CARD_STREAM: u64 = 0;
const MARKET_STREAM: u64 = 1;
const DICE_STREAM_BASE: u64 = 100;

fn stream_rng(seed: Option<u64>, stream: u64) -> Box<dyn DeterministicRng> {
    match seed {
        Some(seed) => Box::new(SeededRng::from_seed(seed.wrapping_add(stream))),
        None => Box::new(SeededRng::from_entropy()),
    }
}

/// Logs every cash-flow change.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver;

impl CashFlowObserver for TracingObserver {
    fn on_cash_flow_changed(&self, event: &CashFlowChanged) {
        debug!(
            player_id = %event.player_id,
            total_income = event.total_income,
            total_expenses = event.total_expenses,
            net_cash_flow = event.net_cash_flow,
            "cash flow changed"
        );
    }
}

/// A starting salary job: 3000 income against 2500 of living costs.
fn starting_player(name: &str, observers: &[Arc<dyn CashFlowObserver>]) -> Player {
    let mut player = Player::new(name, true, STARTING_CASH);
    let ledger = player.ledger_mut();
    for observer in observers {
        ledger.subscribe(Arc::clone(observer));
    }
    ledger.add_income("Salary", 3000.0);
    ledger.add_expense("Taxes", 600.0);
    ledger.add_expense("Home Mortgage", 900.0);
    ledger.add_expense("Other Expenses", 1000.0);
    player
}

struct Seat {
    player: Arc<Mutex<Player>>,
    movement: Arc<BoardMovement>,
    coordinator: TurnCoordinator,
    completed: u32,
    aborted: u32,
    skipped: u32,
    journal_events: usize,
}

/// End-of-game summary for one seat.
#[derive(Debug, Serialize)]
pub struct SeatReport {
    /// Display name.
    pub name: String,
    /// Player id.
    pub player_id: Uuid,
    /// Liquid cash.
    pub cash: f64,
    /// Board position.
    pub position: usize,
    /// Turns that ran to completion.
    pub turns_completed: u32,
    /// Turns that started but aborted.
    pub turns_aborted: u32,
    /// Turns that could not start.
    pub turns_skipped: u32,
    /// Journal entries the seat's turns produced.
    pub journal_events: usize,
    /// Final ledger.
    pub ledger: LedgerView,
}

/// End-of-game summary.
#[derive(Debug, Serialize)]
pub struct GameReport {
    /// Rounds played.
    pub rounds: u32,
    /// One entry per seat, in seating order.
    pub seats: Vec<SeatReport>,
    /// Every resolved card, in order.
    pub cards: Vec<CardRecord>,
    /// Ledger change notifications across all seats.
    pub cash_flow_changes: usize,
    /// Assets destroyed by card effects.
    pub destroyed_assets: Vec<String>,
}

/// A headless game.
pub struct Game {
    seats: Vec<Seat>,
    cards: Arc<CardSystem>,
    market: Arc<StockMarket>,
    deeds: Arc<Deeds>,
    timer: Arc<dyn Timer>,
    timing: TimingConfig,
    rounds: u32,
    changes: mpsc::UnboundedReceiver<CashFlowChanged>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("seats", &self.seats.len())
            .field("rounds", &self.rounds)
            .field("cards", &self.cards)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Seats AI players on `board` and wires their turn coordinators.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if `seat_names` is empty.
    pub fn new(
        config: &GameConfig,
        catalog: EffectCatalog,
        board: Board,
        seat_names: &[&str],
        timer: Arc<dyn Timer>,
        clock: &Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        if seat_names.is_empty() {
            return Err(DomainError::Configuration(
                "a game needs at least one seat".to_owned(),
            ));
        }

        let board = Arc::new(board);
        let deeds = Arc::new(Deeds::new());
        let engine =
            EffectEngine::new(catalog.classification().clone()).with_world(deeds.clone());
        let pipeline = CardEffectPipeline::new(
            engine,
            Arc::new(PaybackPolicy::default()),
            Arc::clone(&timer),
            config.timing.ai_decision_delay,
        );
        let cards = Arc::new(CardSystem::new(
            catalog,
            pipeline,
            stream_rng(config.seed, CARD_STREAM),
        ));
        let market = Arc::new(StockMarket::new(
            stream_rng(config.seed, MARKET_STREAM),
            Arc::clone(&timer),
            config.timing.ai_decision_delay,
        ));

        let (channel, changes) = ChannelObserver::channel();
        let observers: [Arc<dyn CashFlowObserver>; 2] =
            [Arc::new(TracingObserver), Arc::new(channel)];

        let mut seats = Vec::with_capacity(seat_names.len());
        for (index, name) in (0_u64..).zip(seat_names) {
            let player = starting_player(name, &observers);
            let player_id = player.id;
            let player = Arc::new(Mutex::new(player));
            let movement = Arc::new(BoardMovement::new(
                Arc::clone(&player),
                Arc::clone(&board),
                Arc::clone(&deeds),
                Arc::clone(&cards),
                Arc::clone(&market),
                Arc::clone(&timer),
                config.timing.step_interval,
            ));
            let dice = SimulatedDice::new(
                stream_rng(config.seed, DICE_STREAM_BASE + index),
                MAX_SETTLE_POLLS,
            );
            let coordinator = TurnCoordinator::new(
                player_id,
                Box::new(dice),
                Arc::clone(&timer),
                Arc::clone(clock),
                config,
            )
            .with_movement(movement.clone())
            .with_cards(cards.clone())
            .with_focus(market.clone());

            seats.push(Seat {
                player,
                movement,
                coordinator,
                completed: 0,
                aborted: 0,
                skipped: 0,
                journal_events: 0,
            });
        }

        Ok(Self {
            seats,
            cards,
            market,
            deeds,
            timer,
            timing: config.timing,
            rounds: config.turns,
            changes,
        })
    }

    /// Shared asset registry.
    #[must_use]
    pub fn deeds(&self) -> &Deeds {
        &self.deeds
    }

    /// Plays every round and reports the final state.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not a turn-level failure. Aborted or
    /// blocked turns are counted in the report instead.
    #[instrument(skip(self), fields(rounds = self.rounds, seats = self.seats.len()))]
    pub async fn run(&mut self) -> Result<GameReport, DomainError> {
        for round in 1..=self.rounds {
            debug!(round, "round started");
            for index in 0..self.seats.len() {
                self.take_turn(index).await?;
            }
        }
        self.settle().await;
        Ok(self.report().await)
    }

    async fn take_turn(&mut self, index: usize) -> Result<(), DomainError> {
        let timer = Arc::clone(&self.timer);
        let poll = self.timing.card_poll_interval;
        let seat = &mut self.seats[index];

        let mut attempts = 0;
        loop {
            match seat.coordinator.begin_turn() {
                Ok(_) => break,
                Err(DomainError::LogicConflict(reason)) if attempts < MAX_TRIGGER_ATTEMPTS => {
                    attempts += 1;
                    debug!(seat = index, %reason, attempts, "roll blocked, waiting");
                    timer.sleep(poll).await;
                }
                Err(DomainError::LogicConflict(reason)) => {
                    warn!(seat = index, %reason, "roll stayed blocked, skipping turn");
                    seat.skipped += 1;
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }

        match seat.coordinator.drive_turn().await {
            Ok(outcome) => {
                seat.completed += 1;
                debug!(
                    seat = index,
                    turn_id = %outcome.turn_id,
                    steps = outcome.movement_steps,
                    "turn done"
                );
            }
            Err(e) => {
                seat.aborted += 1;
                warn!(seat = index, error = %e, "turn aborted");
            }
        }
        seat.journal_events += seat.coordinator.take_events().len();
        Ok(())
    }

    async fn settle(&self) {
        while self.market.holds_focus() || self.cards.is_card_animating() {
            self.timer.sleep(self.timing.card_poll_interval).await;
        }
    }

    async fn report(&mut self) -> GameReport {
        let mut seats = Vec::with_capacity(self.seats.len());
        for seat in &self.seats {
            let player = seat.player.lock().await;
            seats.push(SeatReport {
                name: player.name.clone(),
                player_id: player.id,
                cash: player.cash(),
                position: seat.movement.position(),
                turns_completed: seat.completed,
                turns_aborted: seat.aborted,
                turns_skipped: seat.skipped,
                journal_events: seat.journal_events,
                ledger: ledger_view(player.ledger()),
            });
        }

        let mut cash_flow_changes = 0;
        while self.changes.try_recv().is_ok() {
            cash_flow_changes += 1;
        }

        info!(
            rounds = self.rounds,
            cards = self.cards.resolved().len(),
            "game finished"
        );
        GameReport {
            rounds: self.rounds,
            seats,
            cards: self.cards.resolved(),
            cash_flow_changes,
            destroyed_assets: self.deeds.destroyed(),
        }
    }
}
