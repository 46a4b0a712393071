//! Ledger domain model.

pub mod events;
pub mod ledger;
