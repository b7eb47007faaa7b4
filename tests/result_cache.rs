use std::sync::Arc;
use std::thread;

use sheet_reconcile::execution::{CachedOutput, ReconcileMode, ReconcileOptions, Reconciler, ResultCache};

const REFERENCE: &[u8] = br#"{"stores": [{"name": "old"}]}"#;

#[test]
fn latest_before_any_success_is_empty_default_for_active_mode() {
    let auto = Reconciler::default();
    assert_eq!(auto.latest().bytes, br#"{"data":[]}"#.to_vec());
    assert_eq!(auto.latest().filename(), "updated_data.json");

    let fixed = Reconciler::new(ReconcileOptions {
        mode: ReconcileMode::FixedShapeStrict {
            collection_key: "shops".to_string(),
        },
        ..Default::default()
    });
    assert_eq!(fixed.latest().bytes, br#"{"shops":[]}"#.to_vec());
}

#[test]
fn success_is_cached_and_failure_leaves_previous_output() {
    let reconciler = Reconciler::new(ReconcileOptions {
        mode: ReconcileMode::fixed_shape(),
        ..Default::default()
    });

    reconciler.reconcile(b"name\nAcme\n", REFERENCE).unwrap();
    let first = reconciler.latest();
    assert_eq!(first.bytes, br#"{"stores":[{"name":"Acme"}]}"#.to_vec());
    assert_eq!(first.content_type(), "application/json");
    assert_eq!(first.filename(), "updated_stores.json");

    // No header at all: the call fails and nothing is cached.
    let _ = reconciler.reconcile(b"", REFERENCE).unwrap_err();
    assert_eq!(reconciler.latest(), first);
}

#[test]
fn auto_discovery_caches_under_discovered_key() {
    let reconciler = Reconciler::default();
    reconciler
        .reconcile(b"sku\nA-1\n", br#"{"meta": {}, "items": [{"sku": "x"}]}"#)
        .unwrap();

    let latest = reconciler.latest();
    assert_eq!(latest.collection_key, "items");
    assert_eq!(latest.filename(), "updated_items.json");
}

#[test]
fn concurrent_stores_are_last_writer_wins_without_isolation() {
    let cache = Arc::new(ResultCache::new("data"));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.store(CachedOutput {
                    bytes: format!("writer-{i}").into_bytes(),
                    collection_key: "data".to_string(),
                });
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // Exactly one writer's output is visible, whole; which one is not defined.
    let seen = String::from_utf8(cache.retrieve().bytes).unwrap();
    assert!((0..8).any(|i| seen == format!("writer-{i}")));

    // A later store from anyone replaces it.
    cache.store(CachedOutput {
        bytes: b"someone-else".to_vec(),
        collection_key: "data".to_string(),
    });
    assert_eq!(cache.retrieve().bytes, b"someone-else".to_vec());
}
