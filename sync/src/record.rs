use chrono::{DateTime, Utc};
use item_core::{Fingerprint, ItemCategory, LocalId, RecordId, RemoteId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Synchronization state of one logical item across both stores.
///
/// Records are shared as `Arc<SyncRecord>` and compared by pointer identity.
/// The identity index owns placement (`local_id`, `remote_id`, retirement);
/// the surrounding synchronizer owns `last_synced_at` and `suppress_sync`.
#[derive(Debug)]
pub struct SyncRecord {
    id: RecordId,
    category: ItemCategory,
    local_id: OnceLock<LocalId>,
    remote_id: RwLock<Option<RemoteId>>,
    fingerprint: Option<Fingerprint>,
    last_synced_at: RwLock<Option<DateTime<Utc>>>,
    suppress_sync: AtomicBool,
    retired: AtomicBool
}

impl SyncRecord {
    pub(crate) fn new(
        category: ItemCategory,
        local_id: Option<LocalId>,
        fingerprint: Option<Fingerprint>
    ) -> Self {
        let cell = OnceLock::new();
        if let Some(local_id) = local_id {
            let _ = cell.set(local_id);
        }
        Self {
            id: RecordId::new(),
            category,
            local_id: cell,
            remote_id: RwLock::new(None),
            fingerprint,
            last_synced_at: RwLock::new(None),
            suppress_sync: AtomicBool::new(false),
            retired: AtomicBool::new(false)
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn category(&self) -> ItemCategory {
        self.category
    }

    /// `None` only for a record created from a remote item whose local
    /// counterpart has not been saved yet.
    pub fn local_id(&self) -> Option<&LocalId> {
        self.local_id.get()
    }

    pub fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id.read().clone()
    }

    /// Fingerprint computed at creation. Never recomputed.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        *self.last_synced_at.read()
    }

    /// Record the modification time of the last reconciled change.
    ///
    /// Older timestamps never overwrite newer ones.
    pub fn mark_synced(&self, at: DateTime<Utc>) {
        let mut guard = self.last_synced_at.write();
        if guard.is_none_or(|current| at > current) {
            *guard = Some(at);
        }
    }

    pub fn suppress_sync(&self) -> bool {
        self.suppress_sync.load(Ordering::Acquire)
    }

    pub fn set_suppress_sync(&self, suppress: bool) {
        self.suppress_sync.store(suppress, Ordering::Release);
    }

    /// True once the record has been forgotten by the registry.
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> SyncRecordSnapshot {
        SyncRecordSnapshot {
            id: self.id,
            category: self.category,
            local_id: self.local_id().cloned(),
            remote_id: self.remote_id(),
            fingerprint: self.fingerprint.clone(),
            last_synced_at: self.last_synced_at(),
            suppress_sync: self.suppress_sync(),
            retired: self.is_retired()
        }
    }

    pub(crate) fn remote_slot(&self) -> &RwLock<Option<RemoteId>> {
        &self.remote_id
    }

    /// Returns false if a different local id was already set.
    pub(crate) fn set_local_id(&self, local_id: &LocalId) -> bool {
        match self.local_id.set(local_id.clone()) {
            Ok(()) => true,
            Err(_) => self.local_id.get() == Some(local_id)
        }
    }

    pub(crate) fn retire(&self) -> bool {
        !self.retired.swap(true, Ordering::AcqRel)
    }
}

/// Point-in-time view of a [`SyncRecord`], for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecordSnapshot {
    pub id: RecordId,
    pub category: ItemCategory,
    pub local_id: Option<LocalId>,
    pub remote_id: Option<RemoteId>,
    pub fingerprint: Option<Fingerprint>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub suppress_sync: bool,
    pub retired: bool
}
