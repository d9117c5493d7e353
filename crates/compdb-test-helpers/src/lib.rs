//! Test utilities and fixtures for compdb-flags
//!
//! Shared by the core integration tests and the CLI tests.

pub mod fixtures;

pub use fixtures::{command_entry, DatabaseFixture};
