//! Cashflow: Turn Coordination bounded context.
//!
//! Responsible for the dice, and for sequencing one turn: roll, wait for
//! the dice to settle, move the token, wait for any card effect to finish,
//! then respawn the dice for the next roll.

pub mod application;
pub mod domain;
