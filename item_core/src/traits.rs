//! Item references handed to the identity registry.
//!
//! The registry never talks to either store. Callers describe the item they
//! are holding through these traits, with every value already resolved.

use crate::types::{FieldMap, ItemCategory, LocalId, RemoteId};
use serde::{Deserialize, Serialize};

/// An item as seen from the local store.
pub trait LocalItem {
    fn category(&self) -> ItemCategory;

    /// Stable identifier assigned when the item was saved locally.
    fn local_id(&self) -> &LocalId;

    /// Remote identifier stored on the local item, if it has one.
    fn remote_id_hint(&self) -> Option<&RemoteId>;

    fn fields(&self) -> &FieldMap;
}

/// An item as seen from the remote store.
pub trait RemoteItem {
    fn category(&self) -> ItemCategory;

    fn remote_id(&self) -> &RemoteId;

    /// Local identifier the remote item advertises as its origin.
    fn origin_local_id(&self) -> Option<&LocalId>;

    fn fields(&self) -> &FieldMap;
}

/// Owned local item reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalItemRef {
    pub category: ItemCategory,
    pub local_id: LocalId,
    pub remote_id_hint: Option<RemoteId>,
    #[serde(default)]
    pub fields: FieldMap
}

impl LocalItemRef {
    pub fn new(category: ItemCategory, local_id: LocalId) -> Self {
        Self {
            category,
            local_id,
            remote_id_hint: None,
            fields: FieldMap::new()
        }
    }

    pub fn with_remote_hint(mut self, remote_id: RemoteId) -> Self {
        self.remote_id_hint = Some(remote_id);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl LocalItem for LocalItemRef {
    fn category(&self) -> ItemCategory {
        self.category
    }

    fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    fn remote_id_hint(&self) -> Option<&RemoteId> {
        self.remote_id_hint.as_ref()
    }

    fn fields(&self) -> &FieldMap {
        &self.fields
    }
}

/// Owned remote item reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItemRef {
    pub category: ItemCategory,
    pub remote_id: RemoteId,
    pub origin_local_id: Option<LocalId>,
    #[serde(default)]
    pub fields: FieldMap
}

impl RemoteItemRef {
    pub fn new(category: ItemCategory, remote_id: RemoteId) -> Self {
        Self {
            category,
            remote_id,
            origin_local_id: None,
            fields: FieldMap::new()
        }
    }

    pub fn with_origin(mut self, local_id: LocalId) -> Self {
        self.origin_local_id = Some(local_id);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl RemoteItem for RemoteItemRef {
    fn category(&self) -> ItemCategory {
        self.category
    }

    fn remote_id(&self) -> &RemoteId {
        &self.remote_id
    }

    fn origin_local_id(&self) -> Option<&LocalId> {
        self.origin_local_id.as_ref()
    }

    fn fields(&self) -> &FieldMap {
        &self.fields
    }
}
