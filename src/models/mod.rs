//! Titre prediction models.
//!
//! Models are implemented as small, pure functions over constant coefficient
//! tables so that every form host can share them.

pub mod model;

pub use model::*;
