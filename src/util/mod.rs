//! Small helpers shared across layers.

pub mod fs;
pub mod lock;
pub mod timestamp;
