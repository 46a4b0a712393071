//! Cashflow: headless game simulation.
//!
//! Wires the ledger, card effects and turn coordination together around a
//! ring-shaped board and plays a number of rounds with AI seats.

pub mod board;
pub mod cards;
pub mod catalog;
pub mod deeds;
pub mod game;
pub mod market;
pub mod movement;
