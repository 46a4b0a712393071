//! Turn orchestration.

pub mod coordinator;
