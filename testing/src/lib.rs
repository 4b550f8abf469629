//! Shared test fixtures for the item synchronizer workspace.
//!
//! Provides:
//! - Unique identifiers so parallel tests never share keys
//! - Builders for local and remote item references of every category
//! - A literal fingerprint function for scenarios that need exact keys
//! - One-time tracing setup that writes through the test harness

mod fixtures;

pub use fixtures::*;
