//! Shared helpers for the dashboard integration tests.

pub mod fixtures;
pub mod mocks;
pub mod setup;
