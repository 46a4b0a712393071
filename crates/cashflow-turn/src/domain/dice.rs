//! The dice subsystem.
//!
//! A pair of dice lives for exactly one turn: it is spawned at its anchors,
//! rolled, polled until both dice settle, and consumed when the faces are
//! read. The next turn gets a fresh pair.

use cashflow_core::error::DomainError;
use cashflow_core::rng::DeterministicRng;

/// Number of faces on a die.
pub const FACES: u32 = 6;

/// One die.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Die {
    face_value: u8,
    rolling: bool,
}

impl Die {
    /// A resting die showing one.
    #[must_use]
    pub fn spawned() -> Self {
        Self {
            face_value: 1,
            rolling: false,
        }
    }

    /// The face currently up, 1..=6.
    #[must_use]
    pub fn face_value(&self) -> u8 {
        self.face_value
    }

    /// Whether the die is still tumbling.
    #[must_use]
    pub fn is_rolling(&self) -> bool {
        self.rolling
    }
}

/// Two dice whose settle timing is driven externally.
pub trait DiceSubsystem: Send {
    /// Places a fresh pair at the spawn anchors, replacing any current pair.
    fn spawn(&mut self);

    /// Whether a pair is currently on the board.
    fn is_spawned(&self) -> bool;

    /// Starts both dice tumbling.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingCollaborator` if no pair is spawned.
    fn roll(&mut self) -> Result<(), DomainError>;

    /// Advances the settle process by one check and reports whether both
    /// dice have stopped.
    fn poll_settled(&mut self) -> bool;

    /// Reads the final faces and removes the pair from the board. Returns
    /// `None` if no pair is spawned or a die is still rolling.
    fn take_faces(&mut self) -> Option<[u8; 2]>;
}

#[derive(Debug, Clone, Copy)]
struct TumblingDie {
    die: Die,
    polls_left: u32,
}

/// Headless dice: each die tumbles for a random number of checks, then
/// lands on a uniformly random face.
pub struct SimulatedDice {
    rng: Box<dyn DeterministicRng>,
    max_settle_polls: u32,
    pair: Option<[TumblingDie; 2]>,
}

impl std::fmt::Debug for SimulatedDice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedDice")
            .field("max_settle_polls", &self.max_settle_polls)
            .field("pair", &self.pair)
            .finish_non_exhaustive()
    }
}

impl SimulatedDice {
    /// Creates an unspawned pair. Each die needs between one and
    /// `max_settle_polls` checks to settle.
    #[must_use]
    pub fn new(rng: Box<dyn DeterministicRng>, max_settle_polls: u32) -> Self {
        Self {
            rng,
            max_settle_polls: max_settle_polls.max(1),
            pair: None,
        }
    }

    /// The dice currently on the board.
    #[must_use]
    pub fn dice(&self) -> Option<[Die; 2]> {
        self.pair.map(|pair| [pair[0].die, pair[1].die])
    }
}

impl DiceSubsystem for SimulatedDice {
    fn spawn(&mut self) {
        let resting = TumblingDie {
            die: Die::spawned(),
            polls_left: 0,
        };
        self.pair = Some([resting, resting]);
    }

    fn is_spawned(&self) -> bool {
        self.pair.is_some()
    }

    fn roll(&mut self) -> Result<(), DomainError> {
        let Some(pair) = self.pair.as_mut() else {
            return Err(DomainError::MissingCollaborator("dice".to_owned()));
        };
        for tumbling in pair.iter_mut() {
            tumbling.die.rolling = true;
            tumbling.polls_left = self.rng.next_u32_range(1, self.max_settle_polls);
        }
        Ok(())
    }

    fn poll_settled(&mut self) -> bool {
        let Some(pair) = self.pair.as_mut() else {
            return false;
        };
        for tumbling in pair.iter_mut().filter(|t| t.die.rolling) {
            tumbling.polls_left = tumbling.polls_left.saturating_sub(1);
            if tumbling.polls_left == 0 {
                let face = self.rng.next_u32_range(1, FACES);
                tumbling.die.face_value = u8::try_from(face).unwrap_or(1);
                tumbling.die.rolling = false;
            }
        }
        pair.iter().all(|t| !t.die.rolling)
    }

    fn take_faces(&mut self) -> Option<[u8; 2]> {
        let pair = self.pair?;
        if pair.iter().any(|t| t.die.rolling) {
            return None;
        }
        self.pair = None;
        Some([pair[0].die.face_value, pair[1].die.face_value])
    }
}
