//! Cashflow: Card Effects bounded context.
//!
//! Responsible for card effect descriptors, deciding which of a player's
//! assets a card applies to, mutating the player's ledger and inventory
//! accordingly, and resolving sell/keep choices for AI players.

pub mod application;
pub mod domain;
