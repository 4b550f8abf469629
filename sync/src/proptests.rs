#[cfg(test)]
mod proptests {
    use crate::fingerprint::FingerprintDispatch;
    use crate::registry::SyncRegistry;
    use config::{Config, FingerprintRetention};
    use item_core::{ItemCategory, LocalId, RemoteId};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    #[derive(Debug, Clone)]
    enum Op {
        GetOrCreate {
            local: u8,
            hint: Option<u8>,
            fp: Option<u8>
        },
        RegisterRemote {
            remote: u8,
            origin: Option<u8>,
            fp: Option<u8>
        },
        Adopt {
            local: u8,
            remote: u8
        },
        Forget {
            local: u8
        }
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..5, proptest::option::of(0u8..4), proptest::option::of(0u8..3))
                .prop_map(|(local, hint, fp)| Op::GetOrCreate { local, hint, fp }),
            (0u8..4, proptest::option::of(0u8..5), proptest::option::of(0u8..3))
                .prop_map(|(remote, origin, fp)| Op::RegisterRemote { remote, origin, fp }),
            (0u8..5, 0u8..4).prop_map(|(local, remote)| Op::Adopt { local, remote }),
            (0u8..5).prop_map(|local| Op::Forget { local }),
        ]
    }

    fn registry(retention: FingerprintRetention) -> SyncRegistry {
        let mut config = Config::default();
        config.registry.fingerprint_retention = retention;
        config.observability.metrics_enabled = false;
        let mut dispatch = FingerprintDispatch::default();
        for category in ItemCategory::iter() {
            dispatch = dispatch.with_fingerprinter(category, testing::literal_fingerprint);
        }
        SyncRegistry::with_fingerprints(config, dispatch)
    }

    fn local(n: u8) -> LocalId {
        testing::local_id(&format!("L{n}"))
    }

    fn remote(n: u8) -> RemoteId {
        testing::remote_id(&format!("R{n}"))
    }

    fn apply(registry: &SyncRegistry, op: &Op) {
        // Conflicts are expected outcomes here; only the invariants matter.
        match op {
            Op::GetOrCreate { local: l, hint, fp } => {
                let mut item = item_core::LocalItemRef::new(ItemCategory::Task, local(*l));
                if let Some(h) = hint {
                    item = item.with_remote_hint(remote(*h));
                }
                if let Some(f) = fp {
                    item = item.with_field(testing::FINGERPRINT_FIELD, format!("fp-{f}"));
                }
                let _ = registry.get_or_create(&item);
            }
            Op::RegisterRemote { remote: r, origin, fp } => {
                let mut item = item_core::RemoteItemRef::new(ItemCategory::Task, remote(*r));
                if let Some(o) = origin {
                    item = item.with_origin(local(*o));
                }
                if let Some(f) = fp {
                    item = item.with_field(testing::FINGERPRINT_FIELD, format!("fp-{f}"));
                }
                let _ = registry.register_remote(&item);
            }
            Op::Adopt { local: l, remote: r } => {
                if let Some(record) = registry.find_by_local(&local(*l)) {
                    let _ = registry.adopt_remote_id(&record, &remote(*r));
                }
            }
            Op::Forget { local: l } => {
                if let Some(record) = registry.find_by_local(&local(*l)) {
                    registry.forget(&record);
                }
            }
        }
    }

    fn assert_consistent(registry: &SyncRegistry) -> Result<(), TestCaseError> {
        let records = registry.records();
        let mut locals = HashSet::new();
        let mut remotes = HashSet::new();

        for record in &records {
            prop_assert!(!record.is_retired());
            if let Some(local_id) = record.local_id() {
                let found = registry.find_by_local(local_id);
                prop_assert!(found.is_some_and(|f| Arc::ptr_eq(&f, record)));
                prop_assert!(locals.insert(local_id.clone()));
            }
            if let Some(remote_id) = record.remote_id() {
                let found = registry.find_by_remote(&remote_id);
                prop_assert!(found.is_some_and(|f| Arc::ptr_eq(&f, record)));
                prop_assert!(remotes.insert(remote_id));
            }
            if let Some(fingerprint) = record.fingerprint() {
                if let Some(found) = registry.find_by_fingerprint(fingerprint) {
                    prop_assert_eq!(found.fingerprint(), Some(fingerprint));
                    prop_assert!(!found.is_retired());
                }
            }
        }

        let stats = registry.stats();
        prop_assert_eq!(stats.records, records.len());
        prop_assert_eq!(stats.remote_keys, remotes.len());
        Ok(())
    }

    proptest! {
        #[test]
        fn test_index_stays_consistent(ops in proptest::collection::vec(op(), 1..40)) {
            let registry = registry(FingerprintRetention::Retain);
            for op in &ops {
                apply(&registry, op);
                assert_consistent(&registry)?;
            }
        }

        #[test]
        fn test_index_stays_consistent_with_eviction(ops in proptest::collection::vec(op(), 1..40)) {
            let registry = registry(FingerprintRetention::EvictOnRemoteBind);
            for op in &ops {
                apply(&registry, op);
                assert_consistent(&registry)?;
            }
        }

        #[test]
        fn test_get_or_create_is_idempotent(l in 0u8..5, fp in proptest::option::of(0u8..3)) {
            let registry = registry(FingerprintRetention::Retain);
            let mut item = item_core::LocalItemRef::new(ItemCategory::Task, local(l));
            if let Some(f) = fp {
                item = item.with_field(testing::FINGERPRINT_FIELD, format!("fp-{f}"));
            }
            let first = registry.get_or_create(&item).unwrap();
            let second = registry.get_or_create(&item).unwrap();
            prop_assert!(Arc::ptr_eq(&first, &second));
            prop_assert_eq!(registry.len(), 1);
        }
    }
}
