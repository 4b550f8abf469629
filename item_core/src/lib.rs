//! # Item Synchronizer Core
//!
//! Shared types and traits for the local/remote item synchronizer.
//!
//! This crate provides:
//! - The closed set of item categories the synchronizer understands
//! - Identifier newtypes for both stores and for fallback fingerprints
//! - Traits describing item references handed to the identity registry
//!
//! # Best Practices
//!
//! - Empty identifiers are unrepresentable: constructors return `None`
//! - Uses Rust Edition 2024

pub mod traits;
pub mod types;

pub use traits::{LocalItem, LocalItemRef, RemoteItem, RemoteItemRef};
pub use types::{FieldMap, Fingerprint, ItemCategory, LocalId, RecordId, RemoteId};
