//! Token movement around the board.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cashflow_core::error::DomainError;
use cashflow_core::time::Timer;
use cashflow_effects::domain::player::Player;
use cashflow_ledger::domain::ledger::AssetCategory;
use cashflow_turn::domain::collaborators::MovementCollaborator;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::board::{Board, PropertyDeed, Space};
use crate::cards::CardSystem;
use crate::deeds::Deeds;
use crate::market::StockMarket;

/// Monthly investment income added when a seat lands on a business it
/// already owns.
pub const REINVESTMENT_INCOME: f64 = 50.0;

/// Walks one player's token and triggers whatever it lands on.
pub struct BoardMovement {
    player: Arc<Mutex<Player>>,
    board: Arc<Board>,
    deeds: Arc<Deeds>,
    cards: Arc<CardSystem>,
    market: Arc<StockMarket>,
    timer: Arc<dyn Timer>,
    step_interval: Duration,
    position: AtomicUsize,
    moving: AtomicBool,
}

impl std::fmt::Debug for BoardMovement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardMovement")
            .field("position", &self.position.load(Ordering::SeqCst))
            .field("moving", &self.moving.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl BoardMovement {
    /// Places a token on space 0.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player: Arc<Mutex<Player>>,
        board: Arc<Board>,
        deeds: Arc<Deeds>,
        cards: Arc<CardSystem>,
        market: Arc<StockMarket>,
        timer: Arc<dyn Timer>,
        step_interval: Duration,
    ) -> Self {
        Self {
            player,
            board,
            deeds,
            cards,
            market,
            timer,
            step_interval,
            position: AtomicUsize::new(0),
            moving: AtomicBool::new(false),
        }
    }

    /// Current space index.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position.load(Ordering::SeqCst)
    }

    async fn payday(&self) {
        let mut player = self.player.lock().await;
        let net = player.ledger().net_cash_flow();
        player.adjust_cash(net);
        info!(player_id = %player.id, net, cash = player.cash(), "payday");
    }

    async fn land(&self, position: usize) {
        match self.board.space(position) {
            Space::Payday => {}
            Space::Card => {
                if self.cards.draw_for(Arc::clone(&self.player)).is_none() {
                    debug!("card space with an empty deck");
                }
            }
            Space::Market => {
                // the session runs on its own; focus blocks the next roll
                drop(self.market.open_session(Arc::clone(&self.player)));
            }
            Space::Property(deed) => self.offer(deed).await,
        }
    }

    async fn offer(&self, deed: &PropertyDeed) {
        let mut player = self.player.lock().await;
        let owner = self.deeds.owner_of(&deed.name);

        if owner == Some(player.id) {
            if deed.category == AssetCategory::Business
                && player.add_investment_income(&deed.name, REINVESTMENT_INCOME)
            {
                info!(player_id = %player.id, asset = %deed.name, "reinvested");
            }
            return;
        }
        if owner.is_some() || player.cash() < deed.price {
            debug!(player_id = %player.id, asset = %deed.name, ?owner, "property not bought");
            return;
        }
        if !self.deeds.claim(&deed.name, player.id) {
            return;
        }
        player.adjust_cash(-deed.price);
        if player
            .acquire_asset(&deed.name, deed.category, deed.monthly_income)
            .is_some()
        {
            info!(
                player_id = %player.id,
                asset = %deed.name,
                price = deed.price,
                "property bought"
            );
        }
    }
}

#[async_trait]
impl MovementCollaborator for BoardMovement {
    #[instrument(skip(self))]
    async fn move_steps(&self, steps: u32) -> Result<(), DomainError> {
        self.moving.store(true, Ordering::SeqCst);
        let mut position = self.position();
        for _ in 0..steps {
            self.timer.sleep(self.step_interval).await;
            position = self.board.next(position);
            self.position.store(position, Ordering::SeqCst);
            if *self.board.space(position) == Space::Payday {
                self.payday().await;
            }
        }
        self.land(position).await;
        self.moving.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_moving(&self) -> bool {
        self.moving.load(Ordering::SeqCst)
    }
}
