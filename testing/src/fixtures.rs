use item_core::{
    FieldMap, Fingerprint, ItemCategory, LocalId, LocalItemRef, RemoteId, RemoteItemRef
};
use std::sync::Once;
use std::sync::atomic::{AtomicU32, Ordering};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);
static TRACING: Once = Once::new();

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

pub fn unique_local_id() -> LocalId {
    local_id(&unique_id("local"))
}

pub fn unique_remote_id() -> RemoteId {
    remote_id(&unique_id("remote"))
}

pub fn local_id(id: &str) -> LocalId {
    LocalId::new(id).expect("fixture local ids are non-empty")
}

pub fn remote_id(id: &str) -> RemoteId {
    RemoteId::new(id).expect("fixture remote ids are non-empty")
}

pub fn fingerprint(key: &str) -> Fingerprint {
    Fingerprint::new(key).expect("fixture fingerprints are non-empty")
}

/// Install a test-writer subscriber once per process. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        tracing::debug!("Test tracing initialized");
    });
}

/// Field name read by [`literal_fingerprint`].
pub const FINGERPRINT_FIELD: &str = "fp";

/// Fingerprint function that uses the `fp` field verbatim.
pub fn literal_fingerprint(_category: ItemCategory, fields: &FieldMap) -> Option<Fingerprint> {
    fields
        .get(FINGERPRINT_FIELD)
        .and_then(|value| Fingerprint::new(value.clone()))
}

pub fn local_contact(id: &str, first_name: &str, last_name: &str, email: &str) -> LocalItemRef {
    LocalItemRef::new(ItemCategory::Contact, local_id(id))
        .with_field("first_name", first_name)
        .with_field("last_name", last_name)
        .with_field("email1", email)
}

pub fn remote_contact(id: &str, first_name: &str, last_name: &str, email: &str) -> RemoteItemRef {
    RemoteItemRef::new(ItemCategory::Contact, remote_id(id))
        .with_field("first_name", first_name)
        .with_field("last_name", last_name)
        .with_field("email1", email)
}

pub fn local_meeting(id: &str, name: &str, date_start: &str) -> LocalItemRef {
    LocalItemRef::new(ItemCategory::Meeting, local_id(id))
        .with_field("name", name)
        .with_field("date_start", date_start)
}

pub fn remote_meeting(id: &str, name: &str, date_start: &str) -> RemoteItemRef {
    RemoteItemRef::new(ItemCategory::Meeting, remote_id(id))
        .with_field("name", name)
        .with_field("date_start", date_start)
}

/// Local item of `category` whose fingerprint under [`literal_fingerprint`]
/// is `fp`.
pub fn local_with_fp(category: ItemCategory, id: &str, fp: &str) -> LocalItemRef {
    LocalItemRef::new(category, local_id(id)).with_field(FINGERPRINT_FIELD, fp)
}

/// Remote item of `category` whose fingerprint under [`literal_fingerprint`]
/// is `fp`.
pub fn remote_with_fp(category: ItemCategory, id: &str, fp: &str) -> RemoteItemRef {
    RemoteItemRef::new(category, remote_id(id)).with_field(FINGERPRINT_FIELD, fp)
}
