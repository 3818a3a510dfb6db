//! Integration test utilities for the academic resource platform
//!
//! Spawns the full API server against real PostgreSQL and Redis instances
//! and drives it over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
