//! Effect resolution services.

pub mod decision;
pub mod engine;
pub mod pipeline;
pub mod targeting;
