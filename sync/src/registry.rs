//! # Sync Record Registry
//!
//! Finds or creates the single sync record for a logical item, given a
//! reference from either store, and rejects any attempt to let two items
//! collapse onto one identity.
//!
//! Resolution never locks beyond the index's own per-key guarantees. Creation
//! is serialized by one coarse creation lock held across resolve-then-create:
//! creations are rare next to lookups, so a per-key lock is not worth its
//! bookkeeping.

use crate::error::{Result, SyncError};
use crate::fingerprint::FingerprintDispatch;
use crate::index::{IdentityIndex, IndexSizes};
use crate::record::SyncRecord;
use crate::telemetry::{LookupPath, RegistryTelemetry};
use config::{Config, RegistryConfig};
use errors::{IdentityError, IdentityKey};
use item_core::{FieldMap, Fingerprint, ItemCategory, LocalId, LocalItem, RemoteId, RemoteItem};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

/// Counts describing the registry at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub records: usize,
    pub remote_bound: usize,
    pub awaiting_local: usize,
    pub local_keys: usize,
    pub remote_keys: usize,
    pub fingerprint_keys: usize
}

pub struct SyncRegistry {
    index: IdentityIndex,
    fingerprints: FingerprintDispatch,
    creation_lock: Mutex<()>,
    config: RegistryConfig,
    telemetry: RegistryTelemetry
}

impl SyncRegistry {
    pub fn new(config: Config) -> Self {
        Self::with_fingerprints(config, FingerprintDispatch::default())
    }

    pub fn with_fingerprints(config: Config, fingerprints: FingerprintDispatch) -> Self {
        let registry = config.registry;
        Self {
            index: IdentityIndex::with_capacity(
                registry.fingerprint_retention,
                registry.initial_capacity
            ),
            fingerprints,
            creation_lock: Mutex::new(()),
            telemetry: RegistryTelemetry::new(&config.observability),
            config: registry
        }
    }

    /// Validate `config` before building the registry.
    pub fn try_new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Build a registry from a TOML or YAML configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = config::load_from_file(path)?;
        Self::try_new(config)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn find_by_local(&self, id: &LocalId) -> Option<Arc<SyncRecord>> {
        self.index.find_by_local(id)
    }

    pub fn find_by_remote(&self, id: &RemoteId) -> Option<Arc<SyncRecord>> {
        self.index.find_by_remote(id)
    }

    pub fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> Option<Arc<SyncRecord>> {
        self.index.find_by_fingerprint(fingerprint)
    }

    pub fn fingerprint_for(&self, category: ItemCategory, fields: &FieldMap) -> Option<Fingerprint> {
        self.fingerprints.fingerprint(category, fields)
    }

    /// Find the record for a local item without creating one.
    ///
    /// Looks up the local id first. A record found there has its remote id
    /// reconciled against the item's hint. Otherwise the hint is looked up by
    /// remote id; a record found that way that has no local id yet is
    /// attached to this item's local id, and one bound to another local item
    /// is reported as `ProbableDuplicateItem`.
    pub fn resolve_from_local(&self, item: &impl LocalItem) -> Result<Option<Arc<SyncRecord>>> {
        let local_id = item.local_id();
        let hint = item.remote_id_hint();

        let by_remote = {
            let _pin = self.index.pin();
            let by_local = self.index.find_by_local(local_id);
            self.telemetry
                .record_lookup(LookupPath::Local, by_local.is_some());
            if let Some(record) = by_local {
                self.check_category(&record, item.category())?;
                self.reconcile_remote_id(&record, hint)?;
                return Ok(Some(record));
            }

            let Some(hint) = hint else {
                return Ok(None);
            };
            let by_remote = self.index.find_by_remote(hint);
            self.telemetry
                .record_lookup(LookupPath::Remote, by_remote.is_some());
            match by_remote {
                Some(record) => {
                    self.check_category(&record, item.category())?;
                    record
                }
                None => return Ok(None)
            }
        };

        if let Some(bound) = by_remote.local_id() {
            if bound != local_id {
                let remote_id = by_remote.remote_id().or_else(|| hint.cloned());
                if let Some(remote_id) = remote_id {
                    return Err(self.flag(IdentityError::ProbableDuplicateItem {
                        remote_id,
                        bound_local_id: bound.clone(),
                        presented_local_id: local_id.clone()
                    }));
                }
            }
        }
        self.attach_local_id(&by_remote, local_id)?;
        Ok(Some(by_remote))
    }

    /// Find the record for a remote item without creating one.
    ///
    /// Tries, strictly in order: the remote id, the local id the remote item
    /// advertises as its origin, then the category fingerprint. A fingerprint
    /// match already bound to a different remote id belongs to another remote
    /// item and is not returned.
    pub fn resolve_from_remote(&self, item: &impl RemoteItem) -> Result<Option<Arc<SyncRecord>>> {
        let _pin = self.index.pin();
        let remote_id = item.remote_id();

        let by_remote = self.index.find_by_remote(remote_id);
        self.telemetry
            .record_lookup(LookupPath::Remote, by_remote.is_some());
        if let Some(record) = by_remote {
            self.check_category(&record, item.category())?;
            return Ok(Some(record));
        }

        if let Some(origin) = item.origin_local_id() {
            let by_origin = self.index.find_by_local(origin);
            self.telemetry
                .record_lookup(LookupPath::LocalHint, by_origin.is_some());
            if let Some(record) = by_origin {
                self.check_category(&record, item.category())?;
                if let Some(bound) = record.remote_id() {
                    if &bound != remote_id {
                        return Err(self.flag(IdentityError::DuplicateIdentity {
                            key: IdentityKey::Remote(bound),
                            held_by: record.id(),
                            claimed_by: format!(
                                "remote item {remote_id} advertising local origin {origin}"
                            )
                        }));
                    }
                }
                return Ok(Some(record));
            }
        }

        let Some(fingerprint) = self.fingerprint_for(item.category(), item.fields()) else {
            return Ok(None);
        };
        let by_fingerprint = self
            .index
            .find_by_fingerprint(&fingerprint)
            .filter(|record| record.remote_id().is_none_or(|bound| &bound == remote_id));
        self.telemetry
            .record_lookup(LookupPath::Fingerprint, by_fingerprint.is_some());
        if let Some(record) = by_fingerprint.as_ref() {
            self.check_category(record, item.category())?;
        }
        Ok(by_fingerprint)
    }

    /// Find or create the record for a local item.
    pub fn get_or_create(&self, item: &impl LocalItem) -> Result<Arc<SyncRecord>> {
        let _creating = self.creation_lock.lock();
        if let Some(record) = self.resolve_from_local(item)? {
            return Ok(record);
        }

        let fingerprint = self.fingerprint_for(item.category(), item.fields());
        let record = Arc::new(SyncRecord::new(
            item.category(),
            Some(item.local_id().clone()),
            fingerprint
        ));
        let stored = self
            .index
            .exclusive()
            .insert_new(Arc::clone(&record), item.remote_id_hint())
            .map_err(|e| self.flag(e))?;

        if Arc::ptr_eq(&stored, &record) {
            self.telemetry.record_created(item.category(), "local");
            tracing::debug!(
                record = %record.id(),
                local_id = %item.local_id(),
                remote_id = ?item.remote_id_hint().map(RemoteId::as_str),
                "Created sync record for local item"
            );
        }
        Ok(stored)
    }

    /// Find or create the record for a remote item with no local counterpart.
    ///
    /// A record found through the origin hint or the fingerprint that has no
    /// remote id yet is bound to this remote item. A new record has no local
    /// id until [`SyncRegistry::attach_local_id`] is called.
    pub fn register_remote(&self, item: &impl RemoteItem) -> Result<Arc<SyncRecord>> {
        let _creating = self.creation_lock.lock();
        if let Some(record) = self.resolve_from_remote(item)? {
            if record.remote_id().is_none() {
                self.index
                    .bind_remote(&record, Some(item.remote_id()))
                    .map_err(|e| self.flag(e))?;
            }
            return Ok(record);
        }

        let fingerprint = self.fingerprint_for(item.category(), item.fields());
        let record = Arc::new(SyncRecord::new(item.category(), None, fingerprint));
        let stored = self
            .index
            .exclusive()
            .insert_new(Arc::clone(&record), Some(item.remote_id()))
            .map_err(|e| self.flag(e))?;

        self.telemetry.record_created(item.category(), "remote");
        tracing::debug!(
            record = %stored.id(),
            remote_id = %item.remote_id(),
            "Created sync record for remote item"
        );
        Ok(stored)
    }

    /// Work out which remote id `record` should carry given a caller's
    /// candidate.
    ///
    /// The record's own id wins over a missing candidate. A candidate is
    /// adopted and bound when the record has none. Two different ids is a
    /// `DuplicateIdentity`, never resolved here.
    pub fn reconcile_remote_id(
        &self,
        record: &Arc<SyncRecord>,
        candidate: Option<&RemoteId>
    ) -> Result<Option<RemoteId>> {
        match (record.remote_id(), candidate) {
            (Some(current), None) => Ok(Some(current)),
            (Some(current), Some(candidate)) if &current == candidate => Ok(Some(current)),
            (Some(current), Some(candidate)) => Err(self.flag(IdentityError::DuplicateIdentity {
                key: IdentityKey::Remote(current),
                held_by: record.id(),
                claimed_by: format!("candidate remote id {candidate}")
            })),
            (None, Some(candidate)) => {
                self.index
                    .bind_remote(record, Some(candidate))
                    .map_err(|e| self.flag(e))?;
                tracing::debug!(
                    record = %record.id(),
                    remote_id = %candidate,
                    "Bound sync record to remote id"
                );
                Ok(Some(candidate.clone()))
            }
            (None, None) => Ok(None)
        }
    }

    /// Re-key `record` to `remote_id`.
    ///
    /// Used when a fingerprint-matched record is confirmed against a freshly
    /// pulled remote item. Atomic with respect to every other registry
    /// operation; any remote id the record held before is released.
    pub fn adopt_remote_id(&self, record: &Arc<SyncRecord>, remote_id: &RemoteId) -> Result<()> {
        let released = self
            .index
            .exclusive()
            .rekey(record, remote_id)
            .map_err(|e| self.flag(e))?;

        self.telemetry.record_rekey();
        tracing::debug!(
            record = %record.id(),
            remote_id = %remote_id,
            released = ?released.as_ref().map(RemoteId::as_str),
            "Adopted remote id"
        );
        Ok(())
    }

    /// Give a remote-origin record the local id of its newly saved local item.
    pub fn attach_local_id(&self, record: &Arc<SyncRecord>, local_id: &LocalId) -> Result<()> {
        if record.local_id() == Some(local_id) && !record.is_retired() {
            if let Some(holder) = self.index.find_by_local(local_id) {
                if Arc::ptr_eq(&holder, record) {
                    return Ok(());
                }
            }
        }
        self.index
            .exclusive()
            .attach_local(record, local_id)
            .map_err(|e| self.flag(e))?;
        tracing::debug!(record = %record.id(), local_id = %local_id, "Attached local id");
        Ok(())
    }

    /// Drop `record` from every index. Forgetting twice is a no-op.
    pub fn forget(&self, record: &Arc<SyncRecord>) -> bool {
        let removed = self.index.remove(record);
        if removed {
            self.telemetry.record_forgotten();
            tracing::debug!(
                record = %record.id(),
                local_id = ?record.local_id().map(LocalId::as_str),
                "Forgot sync record"
            );
        }
        removed
    }

    /// Every live record, each listed once.
    pub fn records(&self) -> Vec<Arc<SyncRecord>> {
        self.index.records()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> RegistryStats {
        let records = self.records();
        let IndexSizes {
            local,
            remote,
            fingerprint
        } = self.index.sizes();
        RegistryStats {
            records: records.len(),
            remote_bound: records.iter().filter(|r| r.remote_id().is_some()).count(),
            awaiting_local: records.iter().filter(|r| r.local_id().is_none()).count(),
            local_keys: local,
            remote_keys: remote,
            fingerprint_keys: fingerprint
        }
    }

    fn check_category(&self, record: &SyncRecord, expected: ItemCategory) -> Result<()> {
        if self.config.verify_categories && record.category() != expected {
            return Err(self.flag(IdentityError::UnexpectedRecordCategory {
                expected,
                found: record.category(),
                record: record.id()
            }));
        }
        Ok(())
    }

    fn flag(&self, err: IdentityError) -> SyncError {
        self.telemetry.record_conflict(err.kind());
        tracing::warn!(kind = err.kind(), "{err}");
        SyncError::Identity(err)
    }
}
