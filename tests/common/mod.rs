//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Local database fixtures
//! - A sync engine wired to an in-memory remote store
//! - PostgREST mock server helpers
//! - Custom assertion macros

pub mod database;
pub mod fixtures;

// Re-export commonly used utilities
pub use database::*;
pub use fixtures::*;
pub use mock_server::*;
