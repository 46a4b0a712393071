//! The stock-market mini-game.
//!
//! A session holds focus for a while, so no seat can roll until it closes.
//! The seat then trades one lot: it sells a held position if it has one,
//! otherwise buys a random symbol if it can afford it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cashflow_core::rng::DeterministicRng;
use cashflow_core::time::Timer;
use cashflow_effects::domain::player::Player;
use cashflow_ledger::domain::ledger::AssetCategory;
use cashflow_turn::domain::collaborators::FocusGuard;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Ticker symbols on offer.
pub const SYMBOLS: [&str; 4] = ["ON2U", "OK4U", "GRO4US", "MYT4U"];

/// Shares per trade.
pub const LOT_SIZE: u32 = 100;

/// Shared market state.
pub struct StockMarket {
    rng: Mutex<Box<dyn DeterministicRng>>,
    timer: Arc<dyn Timer>,
    session_length: Duration,
    in_session: AtomicBool,
}

impl std::fmt::Debug for StockMarket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockMarket")
            .field("session_length", &self.session_length)
            .field("in_session", &self.in_session.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl StockMarket {
    /// Creates a closed market.
    #[must_use]
    pub fn new(
        rng: Box<dyn DeterministicRng>,
        timer: Arc<dyn Timer>,
        session_length: Duration,
    ) -> Self {
        Self {
            rng: Mutex::new(rng),
            timer,
            session_length,
            in_session: AtomicBool::new(false),
        }
    }

    /// Opens a session for `player`. Focus is held from this call until the
    /// returned task finishes trading.
    pub fn open_session(
        self: &Arc<Self>,
        player: Arc<tokio::sync::Mutex<Player>>,
    ) -> JoinHandle<()> {
        self.in_session.store(true, Ordering::SeqCst);
        let market = Arc::clone(self);
        tokio::spawn(async move {
            market.timer.sleep(market.session_length).await;
            let (symbol, price) = market.quote();
            Self::trade(&mut *player.lock().await, symbol, price);
            market.in_session.store(false, Ordering::SeqCst);
        })
    }

    fn quote(&self) -> (&'static str, f64) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let last = u32::try_from(SYMBOLS.len() - 1).unwrap_or(0);
        let symbol = SYMBOLS[rng.next_u32_range(0, last) as usize];
        let price = rng.next_u32_range(1, 40);
        (symbol, f64::from(price))
    }

    fn trade(player: &mut Player, symbol: &str, price: f64) {
        let lot = price * f64::from(LOT_SIZE);
        let held = player.ledger().assets(AssetCategory::Stock).first().cloned();
        let result = match held {
            Some(position) => player
                .sell_shares(&position, lot)
                .map(|()| ("sold", position)),
            None => player
                .buy_shares(symbol, lot)
                .map(|()| ("bought", symbol.to_owned())),
        };
        match result {
            Ok((action, symbol)) => {
                info!(
                    player_id = %player.id,
                    action,
                    %symbol,
                    price,
                    cash = player.cash(),
                    "market trade"
                );
            }
            Err(e) => debug!(player_id = %player.id, error = %e, "market trade skipped"),
        }
    }
}

impl FocusGuard for StockMarket {
    fn holds_focus(&self) -> bool {
        self.in_session.load(Ordering::SeqCst)
    }
}
