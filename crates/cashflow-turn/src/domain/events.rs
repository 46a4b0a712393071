//! Turn journal events.

use cashflow_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type identifier for [`TurnEventKind::Started`].
pub const TURN_STARTED_EVENT_TYPE: &str = "turn.started";

/// Event type identifier for [`TurnEventKind::DiceSettled`].
pub const DICE_SETTLED_EVENT_TYPE: &str = "turn.dice_settled";

/// Event type identifier for [`TurnEventKind::MovementStarted`].
pub const MOVEMENT_STARTED_EVENT_TYPE: &str = "turn.movement_started";

/// Event type identifier for [`TurnEventKind::MovementCompleted`].
pub const MOVEMENT_COMPLETED_EVENT_TYPE: &str = "turn.movement_completed";

/// Event type identifier for [`TurnEventKind::CardEffectAwaited`].
pub const CARD_EFFECT_AWAITED_EVENT_TYPE: &str = "turn.card_effect_awaited";

/// Event type identifier for [`TurnEventKind::Completed`].
pub const TURN_COMPLETED_EVENT_TYPE: &str = "turn.completed";

/// Event type identifier for [`TurnEventKind::Aborted`].
pub const TURN_ABORTED_EVENT_TYPE: &str = "turn.aborted";

/// Event payload variants for a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEventKind {
    /// A roll trigger was accepted.
    Started {
        /// The player whose turn it is.
        player_id: Uuid,
    },
    /// Both dice stopped.
    DiceSettled {
        /// Final faces.
        faces: [u8; 2],
        /// Sum of the faces.
        dice_sum: u32,
        /// Settle checks it took.
        settle_polls: u32,
    },
    /// The token was told to move.
    MovementStarted {
        /// Spaces to move.
        steps: u32,
    },
    /// The token stopped.
    MovementCompleted {
        /// Spaces moved.
        steps: u32,
    },
    /// The coordinator waited for a card to finish.
    CardEffectAwaited {
        /// Card checks it took.
        polls: u32,
    },
    /// The turn finished and fresh dice are ready.
    Completed {
        /// Spaces moved this turn.
        movement_steps: u32,
    },
    /// The turn ended early.
    Aborted {
        /// Why.
        reason: String,
    },
}

/// Domain event envelope for the turn journal.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: TurnEventKind,
}

impl TurnEventKind {
    /// Journal type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => TURN_STARTED_EVENT_TYPE,
            Self::DiceSettled { .. } => DICE_SETTLED_EVENT_TYPE,
            Self::MovementStarted { .. } => MOVEMENT_STARTED_EVENT_TYPE,
            Self::MovementCompleted { .. } => MOVEMENT_COMPLETED_EVENT_TYPE,
            Self::CardEffectAwaited { .. } => CARD_EFFECT_AWAITED_EVENT_TYPE,
            Self::Completed { .. } => TURN_COMPLETED_EVENT_TYPE,
            Self::Aborted { .. } => TURN_ABORTED_EVENT_TYPE,
        }
    }
}

impl DomainEvent for TurnEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
