//! Content store and admin workflow for a portfolio site whose projects and
//! blog posts live as JSON collections in a remote repository.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
