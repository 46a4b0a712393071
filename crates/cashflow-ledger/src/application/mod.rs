//! Read-side helpers for the ledger.

pub mod query_handlers;
