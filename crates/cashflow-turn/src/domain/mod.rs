//! Turn domain model.

pub mod collaborators;
pub mod dice;
pub mod events;
pub mod turn;
