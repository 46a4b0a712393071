//! Effect domain model.

pub mod classification;
pub mod collaborators;
pub mod descriptors;
pub mod player;
