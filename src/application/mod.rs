//! Application services layer.

pub mod admin;
pub mod assistant;
pub mod content;
pub mod error;
pub mod mirror;
pub mod session;
pub mod store;
