//! # Sync Record Registry
//!
//! Identity resolution between a local item store and a remote item store.
//!
//! The registry maps a reference to an item from either side onto the one
//! [`record::SyncRecord`] that tracks that logical item, creating it when
//! needed, and refuses to let two local items share a remote identity.

pub mod error;
pub mod fingerprint;
pub mod index;
pub mod record;
pub mod registry;
pub mod telemetry;

pub use error::{Result, SyncError};
pub use fingerprint::{DistinctFields, FingerprintDispatch, Fingerprinter};
pub use index::IdentityIndex;
pub use record::{SyncRecord, SyncRecordSnapshot};
pub use registry::{RegistryStats, SyncRegistry};

#[cfg(test)]
mod proptests;
