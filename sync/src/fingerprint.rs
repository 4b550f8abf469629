//! Fallback fingerprints, one function per item category.

use item_core::{FieldMap, Fingerprint, ItemCategory};
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Maps an item's distinguishing field values to a stable key.
///
/// Must be pure and deterministic. `None` means the fields do not carry
/// enough data to distinguish the item.
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, category: ItemCategory, fields: &FieldMap) -> Option<Fingerprint>;
}

impl<F> Fingerprinter for F
where
    F: Fn(ItemCategory, &FieldMap) -> Option<Fingerprint> + Send + Sync
{
    fn fingerprint(&self, category: ItemCategory, fields: &FieldMap) -> Option<Fingerprint> {
        self(category, fields)
    }
}

/// Hashes a fixed list of normalized field values.
#[derive(Debug, Clone)]
pub struct DistinctFields {
    fields: Vec<&'static str>
}

impl DistinctFields {
    pub fn new(fields: &[&'static str]) -> Self {
        Self {
            fields: fields.to_vec()
        }
    }

    pub fn for_category(category: ItemCategory) -> Self {
        Self::new(category.distinct_fields())
    }
}

impl Fingerprinter for DistinctFields {
    fn fingerprint(&self, category: ItemCategory, fields: &FieldMap) -> Option<Fingerprint> {
        let values: Vec<(&str, Option<String>)> = self
            .fields
            .iter()
            .map(|name| {
                let value = fields.get(*name).and_then(|v| utils::normalize_field(v));
                (*name, value)
            })
            .collect();

        if values.iter().all(|(_, value)| value.is_none()) {
            return None;
        }

        let namespace = category.to_string();
        let hash = utils::compute_fields_hash(
            &namespace,
            values
                .iter()
                .map(|(name, value)| (*name, value.as_deref().unwrap_or("")))
        );
        Fingerprint::new(hash)
    }
}

/// One fingerprint function per category.
#[derive(Clone)]
pub struct FingerprintDispatch {
    by_category: HashMap<ItemCategory, Arc<dyn Fingerprinter>>
}

impl FingerprintDispatch {
    /// Replace the function used for `category`.
    pub fn with_fingerprinter(
        mut self,
        category: ItemCategory,
        fingerprinter: impl Fingerprinter + 'static
    ) -> Self {
        self.by_category.insert(category, Arc::new(fingerprinter));
        self
    }

    pub fn fingerprint(&self, category: ItemCategory, fields: &FieldMap) -> Option<Fingerprint> {
        self.by_category
            .get(&category)
            .and_then(|f| f.fingerprint(category, fields))
    }
}

impl Default for FingerprintDispatch {
    fn default() -> Self {
        let by_category = ItemCategory::iter()
            .map(|category| {
                let f: Arc<dyn Fingerprinter> = Arc::new(DistinctFields::for_category(category));
                (category, f)
            })
            .collect();
        Self { by_category }
    }
}

impl std::fmt::Debug for FingerprintDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut categories: Vec<_> = self.by_category.keys().collect();
        categories.sort();
        f.debug_struct("FingerprintDispatch")
            .field("categories", &categories)
            .finish()
    }
}
