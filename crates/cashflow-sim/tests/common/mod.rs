//! Shared helpers for simulation integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use cashflow_core::config::{DebugOverride, GameConfig, TimingConfig};
use cashflow_core::time::Clock;
use cashflow_effects::domain::descriptors::{EffectCatalog, EffectDescriptor};
use cashflow_ledger::domain::ledger::AssetCategory;
use cashflow_sim::board::{Board, PropertyDeed, Space};
use cashflow_sim::game::Game;
use cashflow_test_support::{InstantTimer, fixed_clock};

/// Card-poll interval distinct from every other interval, so tests can
/// count blocked-roll retries.
pub const CARD_POLL: Duration = Duration::from_millis(7);

/// Seeded config; `steps` switches on the movement override.
pub fn test_config(turns: u32, steps: Option<u32>) -> GameConfig {
    GameConfig {
        seed: Some(42),
        turns,
        catalog_path: None,
        timing: TimingConfig {
            card_poll_interval: CARD_POLL,
            ..TimingConfig::default()
        },
        debug: steps.map(DebugOverride::fixed).unwrap_or_default(),
    }
}

/// A property space.
pub fn property(name: &str, category: AssetCategory, price: f64, monthly_income: f64) -> Space {
    Space::Property(PropertyDeed::new(name, category, price, monthly_income))
}

/// A board from spaces.
pub fn board(spaces: Vec<Space>) -> Board {
    Board::new(spaces).unwrap()
}

/// A catalog from descriptors.
pub fn deck(cards: Vec<EffectDescriptor>) -> EffectCatalog {
    EffectCatalog::from_descriptors(cards).unwrap()
}

/// Builds a game on an instant timer and the fixed clock.
pub fn build_game(
    config: &GameConfig,
    catalog: EffectCatalog,
    board: Board,
    seats: &[&str],
) -> (Game, Arc<InstantTimer>) {
    let timer = Arc::new(InstantTimer::new());
    let clock: Arc<dyn Clock> = Arc::new(fixed_clock());
    let game = Game::new(
        config,
        catalog,
        board,
        seats,
        timer.clone(),
        &clock,
    )
    .unwrap();
    (game, timer)
}
