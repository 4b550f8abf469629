//! # Item Synchronizer Utilities
//!
//! Hashing and normalization helpers used to derive fallback fingerprints
//! from item field values.
//!
//! # Best Practices
//!
//! - Uses SHA-2 for stable hashing across processes and platforms
//! - Normalizes values before hashing so cosmetic edits do not change keys

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of content string
///
/// # Examples
///
/// ```
/// use utils::compute_content_hash;
///
/// let hash = compute_content_hash("hello world");
/// assert_eq!(hash.len(), 64);
/// ```
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Normalize a raw field value for fingerprinting.
///
/// Trims, collapses internal whitespace runs to a single space and lowercases.
/// Returns `None` for values that are blank after trimming.
#[must_use]
pub fn normalize_field(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}

/// Hash a namespace and an ordered list of `name=value` pairs.
///
/// Every pair is length-prefixed so that `("ab", "c")` and `("a", "bc")`
/// never collide.
#[must_use]
pub fn compute_fields_hash<'a, I>(namespace: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>
{
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    for (name, value) in pairs {
        for part in [name, value] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
    }
    hex::encode(hasher.finalize())
}
