//! Cashflow Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the ledger,
//! effect and turn crates depend on. It contains no game rules.

pub mod config;
pub mod error;
pub mod event;
pub mod rng;
pub mod time;
