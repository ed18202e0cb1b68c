//! Integration Tests for the TTL cache
//!
//! Exercises the public API across every storage backend, including the
//! background janitor.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mini_cache::{BackendKind, CacheError, Expiration, StorageBackend, TtlCache, TtlCacheConfig};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("mini_cache=debug")
        .with_test_writer()
        .try_init();
}

fn create_cache(kind: BackendKind, default: Duration, sweep: Duration) -> TtlCache<i32> {
    TtlCache::new(
        TtlCacheConfig::unbounded()
            .with_default_expiration(default)
            .with_sweep_interval(sweep)
            .with_backend(kind),
    )
    .unwrap()
}

// == Expiration Timeline ==

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_expiration_timeline() {
    init_tracing();

    for kind in BackendKind::ALL {
        let cache = create_cache(kind, Duration::from_millis(50), Duration::from_millis(1));
        let start = Instant::now();
        cache.set("a", 1, Expiration::Default);
        cache.set("b", 2, Expiration::Never);
        cache.set("c", 3, Expiration::After(Duration::from_millis(20)));
        cache.set("d", 4, Expiration::After(Duration::from_millis(70)));

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.get("c"), None, "{kind}: c should have expired");

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("a"), None, "{kind}: a should have expired");
        assert_eq!(cache.get("b"), Some(2), "{kind}: b never expires");
        if start.elapsed() < Duration::from_millis(65) {
            assert_eq!(cache.get("d"), Some(4), "{kind}: d expires after the default");
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("d"), None, "{kind}: d should have expired");

        // The janitor has had time to remove everything but "b"
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.item_count(), 1, "{kind}");
        assert!(cache.stats().expired >= 3, "{kind}");

        cache.close();
    }
}

#[test]
fn test_never_expiring_entry_outlives_default() {
    for kind in BackendKind::ALL {
        let cache = create_cache(kind, Duration::from_millis(10), Duration::ZERO);
        cache.set("forever", 1, Expiration::Never);
        cache.set("default", 2, Expiration::Default);

        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get("forever"), Some(1), "{kind}");
        assert_eq!(cache.get("default"), None, "{kind}");
        assert!(cache.get_with_expiration("forever").unwrap().1.is_none());
    }
}

#[test]
fn test_without_janitor_expired_entries_stay_until_swept() {
    let cache = create_cache(BackendKind::Locked, Duration::from_millis(5), Duration::ZERO);
    assert!(!cache.has_janitor());
    cache.set_default("a", 1);
    cache.set_default("b", 2);

    thread::sleep(Duration::from_millis(20));

    assert_eq!(cache.item_count(), 2);
    assert!(cache.items().is_empty());
    assert_eq!(cache.sweep(), 2);
    assert_eq!(cache.item_count(), 0);
}

// == Lifecycle ==

#[tokio::test]
async fn test_dropping_cache_stops_janitor() {
    let cache = create_cache(
        BackendKind::Striped,
        Duration::from_millis(5),
        Duration::from_millis(1),
    );
    cache.set_default("a", 1);
    drop(cache);

    // Nothing to observe directly; the runtime must stay healthy
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[test]
fn test_janitor_outside_runtime_is_rejected() {
    let result: mini_cache::Result<TtlCache<i32>> = TtlCache::new(
        TtlCacheConfig::unbounded().with_sweep_interval(Duration::from_millis(1)),
    );
    assert!(matches!(result, Err(CacheError::RuntimeUnavailable)));
}

// == Custom Backend ==

#[test]
fn test_explicit_backend() {
    let backend = mini_cache::cache::StripedMap::new();
    let cache: TtlCache<&str, _> = TtlCache::with_backend(backend, None, None).unwrap();
    cache.set_default("k", "v");

    assert_eq!(cache.get("k"), Some("v"));
    assert_eq!(cache.backend_kind(), BackendKind::Striped);
    assert_eq!(cache.default_expiration(), None);
}

#[test]
fn test_boxed_backend_from_kind() {
    let backend: Box<dyn StorageBackend<i32>> = BackendKind::Atomic.build();
    let cache: TtlCache<i32> =
        TtlCache::with_backend(backend, Some(Duration::from_secs(60)), None).unwrap();
    cache.set_default("k", 7);

    let (value, expires) = cache.get_with_expiration("k").unwrap();
    assert_eq!(value, 7);
    assert!(expires.is_some());
}

// == Concurrency ==

#[test]
fn test_concurrent_access_with_sweeps() {
    for kind in BackendKind::ALL {
        let cache = Arc::new(create_cache(kind, Duration::from_millis(2), Duration::ZERO));

        let writers: Vec<_> = (0..4)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("w{worker}-{i}");
                        if i % 2 == 0 {
                            cache.set(key.clone(), i, Expiration::Never);
                            assert_eq!(cache.get(&key), Some(i));
                        } else {
                            cache.set(key, i, Expiration::Default);
                        }
                    }
                })
            })
            .collect();

        let sweeper = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..50 {
                    cache.sweep();
                    thread::sleep(Duration::from_millis(1));
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        sweeper.join().unwrap();

        thread::sleep(Duration::from_millis(10));
        cache.sweep();

        // Only the never-expiring half survives, and none of it was lost
        assert_eq!(cache.items().len(), 4 * 250, "{kind}");
        for worker in 0..4 {
            assert_eq!(cache.get(&format!("w{worker}-0")), Some(0), "{kind}");
        }
    }
}

#[test]
fn test_atomic_backend_count_overshoots_on_overwrite() {
    let cache = create_cache(BackendKind::Atomic, Duration::ZERO, Duration::ZERO);
    cache.set_default("k", 1);
    cache.set_default("k", 2);

    assert_eq!(cache.item_count(), 2);
    assert_eq!(cache.items().len(), 1);

    cache.delete("k");
    assert_eq!(cache.item_count(), 1);
    cache.flush();
    assert_eq!(cache.item_count(), 0);
}
