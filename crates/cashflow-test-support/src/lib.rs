//! Shared test mocks and utilities for the Cashflow board game engine.

mod clock;
mod rng;
mod timer;

pub use clock::{FixedClock, fixed_clock};
pub use rng::{MockRng, SequenceRng};
pub use timer::InstantTimer;
