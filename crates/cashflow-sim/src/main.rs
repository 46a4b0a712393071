//! Cashflow board game simulation entry point.

use std::error::Error;
use std::sync::Arc;

use cashflow_core::config::GameConfig;
use cashflow_core::time::{Clock, SystemClock, TokioTimer};
use cashflow_sim::board::Board;
use cashflow_sim::catalog::{default_catalog, load_catalog};
use cashflow_sim::game::{DEFAULT_SEATS, Game};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = GameConfig::from_env()?;
    tracing::info!(
        seed = ?config.seed,
        turns = config.turns,
        debug_move = config.debug.enabled,
        "Starting Cashflow simulation"
    );

    let catalog = match &config.catalog_path {
        Some(path) => load_catalog(path)?,
        None => default_catalog()?,
    };
    tracing::info!(cards = catalog.len(), "card catalog loaded");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut game = Game::new(
        &config,
        catalog,
        Board::standard(),
        &DEFAULT_SEATS,
        Arc::new(TokioTimer),
        &clock,
    )?;
    let report = game.run().await?;

    for seat in &report.seats {
        tracing::info!(
            name = %seat.name,
            cash = seat.cash,
            net_cash_flow = seat.ledger.net_cash_flow,
            turns = seat.turns_completed,
            "final standing"
        );
    }
    tracing::info!(report = %serde_json::to_string(&report)?, "game report");

    Ok(())
}
