//! # Item Synchronizer Errors
//!
//! Identity conditions surfaced by the sync-record registry.
//!
//! Follows Microsoft Pragmatic Rust Guidelines:
//! - Uses `thiserror` for structured error definitions
//! - Provides `Display` and `Error` trait implementations
//! - Includes error context for debugging
//!
//! "No record found" is not an error: lookups return `Option`.

use item_core::{ItemCategory, LocalId, RecordId, RemoteId};
use std::fmt;
use thiserror::Error;

/// An identifier that at most one sync record may hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Local(LocalId),
    Remote(RemoteId)
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(id) => write!(f, "local id {id}"),
            Self::Remote(id) => write!(f, "remote id {id}")
        }
    }
}

/// Identity resolution errors
///
/// None of these are resolved by the registry itself. Every variant leaves
/// the registry state exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Two distinct records claim the same identity, or one record disagrees
    /// with a caller about which remote identity it has.
    #[error("Duplicate identity: {key} held by record {held_by}, claimed by {claimed_by}")]
    DuplicateIdentity {
        key: IdentityKey,
        held_by: RecordId,
        claimed_by: String
    },

    /// A record found by remote id is bound to a different local item than
    /// the one the caller is holding.
    #[error(
        "Probable duplicate item: remote id {remote_id} is bound to local item {bound_local_id}, not {presented_local_id}"
    )]
    ProbableDuplicateItem {
        remote_id: RemoteId,
        bound_local_id: LocalId,
        presented_local_id: LocalId
    },

    #[error("Unexpected record category: expected {expected}, found {found} on record {record}")]
    UnexpectedRecordCategory {
        expected: ItemCategory,
        found: ItemCategory,
        record: RecordId
    },

    #[error("Record {record} has been forgotten and can no longer be bound")]
    RecordForgotten { record: RecordId }
}

impl IdentityError {
    /// Short, stable name for metrics labels and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity { .. } => "duplicate_identity",
            Self::ProbableDuplicateItem { .. } => "probable_duplicate_item",
            Self::UnexpectedRecordCategory { .. } => "unexpected_record_category",
            Self::RecordForgotten { .. } => "record_forgotten"
        }
    }
}
