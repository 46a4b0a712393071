//! Domain error types.
//!
//! None of these are fatal: the game keeps running and callers decide
//! whether to surface them. They exist so tests can assert on the exact
//! reason an operation degraded to a no-op.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A collaborator required at the moment of use was not wired in.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(String),

    /// Input rejected by an operation that reports validation failures.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation does not apply to the current state, e.g. a sell/keep
    /// choice on a card that offers no choice, or a roll while a turn is in
    /// flight.
    #[error("logic conflict: {0}")]
    LogicConflict(String),

    /// Static configuration (card catalogs, environment) could not be used.
    #[error("configuration error: {0}")]
    Configuration(String),
}
