//! Cashflow: Ledger bounded context.
//!
//! Responsible for a player's income and expense items, the names of the
//! assets they own, derived totals, and notifying observers whenever the
//! net cash flow changes.

pub mod application;
pub mod domain;
