//! Domain layer types and invariants.

pub mod collection;
pub mod entities;
pub mod error;
pub mod types;
