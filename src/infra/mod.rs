//! Infrastructure adapters and runtime bootstrap.

pub mod chat;
pub mod error;
pub mod fs_mirror;
pub mod fs_session;
pub mod fs_store;
pub mod github;
pub mod memory;
pub mod telemetry;
