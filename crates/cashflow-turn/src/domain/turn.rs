//! Turn phases and per-turn state.

use cashflow_core::config::DebugOverride;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the coordinator is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TurnPhase {
    /// Ready for a roll trigger.
    #[default]
    Idle,
    /// Dice have been told to roll.
    Rolling,
    /// Polling until both dice settle.
    AwaitingSettle,
    /// Reading faces and showing the result.
    Resolving,
    /// The token is moving.
    AwaitingMovement,
    /// A drawn card is still resolving.
    AwaitingCardEffect,
    /// Putting a fresh pair of dice on the board.
    Respawning,
}

impl TurnPhase {
    /// Snake-case name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Rolling => "rolling",
            Self::AwaitingSettle => "awaiting_settle",
            Self::Resolving => "resolving",
            Self::AwaitingMovement => "awaiting_movement",
            Self::AwaitingCardEffect => "awaiting_card_effect",
            Self::Respawning => "respawning",
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State for the turn in flight. Discarded when the turn ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    /// Identifies the turn in events and logs.
    pub turn_id: Uuid,
    /// Shared by every event the turn emits.
    pub correlation_id: Uuid,
    /// Faces read after settling.
    pub faces: Option<[u8; 2]>,
    /// Sum of both faces, zero until resolved.
    pub dice_sum: u32,
    /// Spaces the token is told to move.
    pub movement_steps: u32,
    /// Current phase.
    pub phase: TurnPhase,
}

impl TurnContext {
    /// A fresh context in `Rolling`.
    #[must_use]
    pub fn start() -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            correlation_id: Uuid::new_v4(),
            faces: None,
            dice_sum: 0,
            movement_steps: 0,
            phase: TurnPhase::Rolling,
        }
    }
}

/// Spaces to move for `faces`; the debug override replaces the dice sum.
#[must_use]
pub fn movement_steps(faces: [u8; 2], debug: DebugOverride) -> u32 {
    if debug.enabled {
        return debug.fixed_steps;
    }
    u32::from(faces[0]) + u32::from(faces[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_the_dice_sum() {
        assert_eq!(movement_steps([3, 5], DebugOverride::default()), 8);
        assert_eq!(movement_steps([6, 6], DebugOverride::default()), 12);
    }

    #[test]
    fn test_debug_override_replaces_the_sum() {
        assert_eq!(movement_steps([3, 5], DebugOverride::fixed(1)), 1);
    }

    #[test]
    fn test_disabled_override_is_ignored() {
        let debug = DebugOverride {
            enabled: false,
            fixed_steps: 1,
        };
        assert_eq!(movement_steps([2, 2], debug), 4);
    }

    #[test]
    fn test_new_context_starts_rolling_with_no_result() {
        // Act
        let context = TurnContext::start();

        // Assert
        assert_eq!(context.phase, TurnPhase::Rolling);
        assert_eq!(context.faces, None);
        assert_eq!(context.dice_sum, 0);
        assert_ne!(context.turn_id, context.correlation_id);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(TurnPhase::default(), TurnPhase::Idle);
        assert_eq!(
            TurnPhase::AwaitingCardEffect.to_string(),
            "awaiting_card_effect"
        );
    }
}
