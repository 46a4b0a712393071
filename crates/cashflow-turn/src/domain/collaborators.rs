//! Narrow interfaces to the subsystems a turn waits on.

use async_trait::async_trait;
use cashflow_core::error::DomainError;

/// Moves the current player's token.
#[async_trait]
pub trait MovementCollaborator: Send + Sync {
    /// Moves the token `steps` spaces and returns once it has stopped.
    async fn move_steps(&self, steps: u32) -> Result<(), DomainError>;

    /// Whether the token is currently moving.
    fn is_moving(&self) -> bool;
}

/// Reports whether a drawn card is still being presented or resolved.
pub trait CardCollaborator: Send + Sync {
    /// True from the moment a card is drawn until its effect is applied.
    fn is_card_animating(&self) -> bool;
}

/// Exclusive activities (the stock-market mini-game) that block rolling.
pub trait FocusGuard: Send + Sync {
    /// True while an activity holds input focus.
    fn holds_focus(&self) -> bool;
}
