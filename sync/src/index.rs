//! Identity index: three mappings onto sync records, kept mutually consistent.
//!
//! Each map is a `DashMap`, so single-key lookups, inserts and binds are
//! atomic per key while distinct keys proceed in parallel. Operations that
//! touch several keys of one record at once (creation, re-keying, removal)
//! run under the exclusive side of a visibility gate, so a reader holding the
//! shared side sees a record either under all of its keys or under none.
//!
//! Lock order: gate, then a record's remote slot, then map shards. No record
//! lock is ever taken while a map reference is alive.

use crate::record::SyncRecord;
use config::FingerprintRetention;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use errors::{IdentityError, IdentityKey};
use item_core::{Fingerprint, LocalId, RemoteId};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashSet;
use std::sync::Arc;

pub struct IdentityIndex {
    by_local: DashMap<LocalId, Arc<SyncRecord>>,
    by_remote: DashMap<RemoteId, Arc<SyncRecord>>,
    by_fingerprint: DashMap<Fingerprint, Arc<SyncRecord>>,
    gate: RwLock<()>,
    retention: FingerprintRetention
}

/// Sizes of the three maps at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexSizes {
    pub local: usize,
    pub remote: usize,
    pub fingerprint: usize
}

impl IdentityIndex {
    pub fn new(retention: FingerprintRetention) -> Self {
        Self::with_capacity(retention, 0)
    }

    pub fn with_capacity(retention: FingerprintRetention, capacity: usize) -> Self {
        Self {
            by_local: DashMap::with_capacity(capacity),
            by_remote: DashMap::with_capacity(capacity),
            by_fingerprint: DashMap::with_capacity(capacity),
            gate: RwLock::new(()),
            retention
        }
    }

    /// Hold the shared side of the gate across a sequence of lookups.
    ///
    /// Recursive so that index calls made while pinned never queue behind a
    /// waiting writer. Exclusive operations must not be started while pinned.
    pub(crate) fn pin(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read_recursive()
    }

    pub(crate) fn exclusive(&self) -> ExclusiveIndex<'_> {
        ExclusiveIndex {
            index: self,
            _guard: self.gate.write()
        }
    }

    pub fn find_by_local(&self, id: &LocalId) -> Option<Arc<SyncRecord>> {
        let _pin = self.pin();
        self.by_local.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn find_by_remote(&self, id: &RemoteId) -> Option<Arc<SyncRecord>> {
        let _pin = self.pin();
        self.by_remote.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> Option<Arc<SyncRecord>> {
        let _pin = self.pin();
        self.by_fingerprint
            .get(fingerprint)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Insert `record` under `id` unless the key is taken.
    ///
    /// First writer wins: the returned record is whichever one now occupies
    /// `id`. Callers compare it with `Arc::ptr_eq` to learn whether their
    /// insert happened.
    pub fn insert_by_local(&self, id: &LocalId, record: &Arc<SyncRecord>) -> Arc<SyncRecord> {
        let _pin = self.pin();
        match self.by_local.entry(id.clone()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(record));
                Arc::clone(record)
            }
        }
    }

    /// Bind `record` to `remote_id` and stamp the id on the record.
    ///
    /// `None` is a no-op. Rebinding a record to the id it already holds is a
    /// no-op. Binding a record that holds a different remote id, or binding an
    /// id another record holds, fails with `DuplicateIdentity` and changes
    /// nothing.
    pub fn bind_remote(
        &self,
        record: &Arc<SyncRecord>,
        remote_id: Option<&RemoteId>
    ) -> Result<(), IdentityError> {
        let Some(remote_id) = remote_id else {
            return Ok(());
        };
        let _pin = self.pin();
        if record.is_retired() {
            return Err(IdentityError::RecordForgotten {
                record: record.id()
            });
        }

        let mut slot = record.remote_slot().write();
        if let Some(current) = slot.as_ref() {
            if current != remote_id {
                return Err(IdentityError::DuplicateIdentity {
                    key: IdentityKey::Remote(current.clone()),
                    held_by: record.id(),
                    claimed_by: format!("candidate remote id {remote_id}")
                });
            }
        }

        match self.by_remote.entry(remote_id.clone()) {
            Entry::Occupied(entry) => {
                if !Arc::ptr_eq(entry.get(), record) {
                    return Err(IdentityError::DuplicateIdentity {
                        key: IdentityKey::Remote(remote_id.clone()),
                        held_by: entry.get().id(),
                        claimed_by: format!("record {}", record.id())
                    });
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(record));
            }
        }
        *slot = Some(remote_id.clone());
        drop(slot);

        if self.retention == FingerprintRetention::EvictOnRemoteBind {
            self.evict_fingerprint(record);
        }
        Ok(())
    }

    /// Unconditionally point `fingerprint` at `record`.
    pub fn bind_fingerprint(&self, fingerprint: &Fingerprint, record: &Arc<SyncRecord>) {
        let _pin = self.pin();
        self.by_fingerprint
            .insert(fingerprint.clone(), Arc::clone(record));
    }

    /// Remove `record` from every map that points at it. Returns false if the
    /// record was already gone.
    pub fn remove(&self, record: &Arc<SyncRecord>) -> bool {
        self.exclusive().remove(record)
    }

    pub fn sizes(&self) -> IndexSizes {
        let _pin = self.pin();
        IndexSizes {
            local: self.by_local.len(),
            remote: self.by_remote.len(),
            fingerprint: self.by_fingerprint.len()
        }
    }

    /// Every record reachable from at least one key, each listed once.
    pub fn records(&self) -> Vec<Arc<SyncRecord>> {
        let _pin = self.pin();
        let mut candidates: Vec<Arc<SyncRecord>> = Vec::new();
        candidates.extend(self.by_local.iter().map(|entry| Arc::clone(entry.value())));
        candidates.extend(self.by_remote.iter().map(|entry| Arc::clone(entry.value())));
        candidates.extend(
            self.by_fingerprint
                .iter()
                .map(|entry| Arc::clone(entry.value()))
        );

        let mut seen = HashSet::new();
        candidates.retain(|record| seen.insert(Arc::as_ptr(record)));
        candidates
    }

    fn evict_fingerprint(&self, record: &Arc<SyncRecord>) {
        if let Some(fingerprint) = record.fingerprint() {
            self.by_fingerprint
                .remove_if(fingerprint, |_, current| Arc::ptr_eq(current, record));
        }
    }
}

/// The index with the exclusive side of the gate held.
pub(crate) struct ExclusiveIndex<'a> {
    index: &'a IdentityIndex,
    _guard: RwLockWriteGuard<'a, ()>
}

impl ExclusiveIndex<'_> {
    /// Enter a freshly built record under every key derivable for it.
    ///
    /// All or nothing: if the record's local id is already indexed the
    /// occupant is returned and nothing is inserted; if `remote_id` belongs to
    /// another record the call fails and nothing is inserted.
    pub(crate) fn insert_new(
        &self,
        record: Arc<SyncRecord>,
        remote_id: Option<&RemoteId>
    ) -> Result<Arc<SyncRecord>, IdentityError> {
        let index = self.index;
        if let Some(local_id) = record.local_id() {
            if let Some(existing) = index.by_local.get(local_id) {
                return Ok(Arc::clone(existing.value()));
            }
        }
        if let Some(remote_id) = remote_id {
            if let Some(holder) = index.by_remote.get(remote_id) {
                return Err(IdentityError::DuplicateIdentity {
                    key: IdentityKey::Remote(remote_id.clone()),
                    held_by: holder.id(),
                    claimed_by: describe_claimant(&record)
                });
            }
        }

        if let Some(local_id) = record.local_id() {
            index.by_local.insert(local_id.clone(), Arc::clone(&record));
        }
        if let Some(remote_id) = remote_id {
            *record.remote_slot().write() = Some(remote_id.clone());
            index.by_remote.insert(remote_id.clone(), Arc::clone(&record));
        }
        let evict = remote_id.is_some() && index.retention == FingerprintRetention::EvictOnRemoteBind;
        if let Some(fingerprint) = record.fingerprint() {
            if !evict {
                index
                    .by_fingerprint
                    .insert(fingerprint.clone(), Arc::clone(&record));
            }
        }
        Ok(record)
    }

    /// Give a record without a local id its local id and index it there.
    pub(crate) fn attach_local(
        &self,
        record: &Arc<SyncRecord>,
        local_id: &LocalId
    ) -> Result<(), IdentityError> {
        let index = self.index;
        if record.is_retired() {
            return Err(IdentityError::RecordForgotten {
                record: record.id()
            });
        }
        if let Some(bound) = record.local_id() {
            if bound != local_id {
                return Err(match record.remote_id() {
                    Some(remote_id) => IdentityError::ProbableDuplicateItem {
                        remote_id,
                        bound_local_id: bound.clone(),
                        presented_local_id: local_id.clone()
                    },
                    None => IdentityError::DuplicateIdentity {
                        key: IdentityKey::Local(bound.clone()),
                        held_by: record.id(),
                        claimed_by: format!("local item {local_id}")
                    }
                });
            }
        }
        if let Some(holder) = index.by_local.get(local_id) {
            if !Arc::ptr_eq(holder.value(), record) {
                return Err(IdentityError::DuplicateIdentity {
                    key: IdentityKey::Local(local_id.clone()),
                    held_by: holder.id(),
                    claimed_by: format!("record {}", record.id())
                });
            }
            return Ok(());
        }

        if !record.set_local_id(local_id) {
            return Err(IdentityError::DuplicateIdentity {
                key: IdentityKey::Local(local_id.clone()),
                held_by: record.id(),
                claimed_by: format!("local item {local_id}")
            });
        }
        index.by_local.insert(local_id.clone(), Arc::clone(record));
        Ok(())
    }

    /// Move a record to `remote_id`, releasing any remote id it held before.
    /// Returns the released id.
    pub(crate) fn rekey(
        &self,
        record: &Arc<SyncRecord>,
        remote_id: &RemoteId
    ) -> Result<Option<RemoteId>, IdentityError> {
        let index = self.index;
        if record.is_retired() {
            return Err(IdentityError::RecordForgotten {
                record: record.id()
            });
        }
        let previous = record.remote_id();
        if previous.as_ref() == Some(remote_id) {
            return Ok(None);
        }
        if let Some(holder) = index.by_remote.get(remote_id) {
            if !Arc::ptr_eq(holder.value(), record) {
                return Err(IdentityError::DuplicateIdentity {
                    key: IdentityKey::Remote(remote_id.clone()),
                    held_by: holder.id(),
                    claimed_by: format!("record {}", record.id())
                });
            }
        }

        index.by_remote.insert(remote_id.clone(), Arc::clone(record));
        if let Some(previous) = previous.as_ref() {
            index
                .by_remote
                .remove_if(previous, |_, current| Arc::ptr_eq(current, record));
        }
        *record.remote_slot().write() = Some(remote_id.clone());
        if index.retention == FingerprintRetention::EvictOnRemoteBind {
            index.evict_fingerprint(record);
        }
        Ok(previous)
    }

    pub(crate) fn remove(&self, record: &Arc<SyncRecord>) -> bool {
        let index = self.index;
        let mut removed = record.retire();

        if let Some(local_id) = record.local_id() {
            removed |= index
                .by_local
                .remove_if(local_id, |_, current| Arc::ptr_eq(current, record))
                .is_some();
        }
        if let Some(remote_id) = record.remote_id() {
            removed |= index
                .by_remote
                .remove_if(&remote_id, |_, current| Arc::ptr_eq(current, record))
                .is_some();
        }
        if let Some(fingerprint) = record.fingerprint() {
            removed |= index
                .by_fingerprint
                .remove_if(fingerprint, |_, current| Arc::ptr_eq(current, record))
                .is_some();
        }
        removed
    }
}

fn describe_claimant(record: &SyncRecord) -> String {
    match record.local_id() {
        Some(local_id) => format!("local item {local_id}"),
        None => format!("record {}", record.id())
    }
}
