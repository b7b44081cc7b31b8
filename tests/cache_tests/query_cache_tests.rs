//! Tests for QueryCache
//!
//! These tests verify:
//! - Exact-text keys, verbatim values
//! - Only successful computations are stored
//! - Concurrent identical misses compute once
//! - Hit/miss statistics

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use housing::cache::{CacheOutcome, CacheStats, QueryCache};
use housing::HousingError;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_get_or_compute_miss_then_hit() {
    let cache = QueryCache::new();

    let (value, outcome) = cache
        .get_or_compute("LIST", || Ok("OK RESULT 0\nEND\n".to_string()))
        .unwrap();
    assert_eq!(value, "OK RESULT 0\nEND\n");
    assert_eq!(outcome, CacheOutcome::Miss);

    let (value, outcome) = cache
        .get_or_compute("LIST", || panic!("must not recompute a cached key"))
        .unwrap();
    assert_eq!(value, "OK RESULT 0\nEND\n");
    assert_eq!(outcome, CacheOutcome::Hit);
}

#[test]
fn test_put_overwrites() {
    let cache = QueryCache::new();
    cache.put("LIST".to_string(), "old".to_string());
    cache.put("LIST".to_string(), "new".to_string());
    assert_eq!(cache.get("LIST").as_deref(), Some("new"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_error_not_cached_and_returned() {
    let cache = QueryCache::new();

    let err = cache
        .get_or_compute("SEARCH city=Irvine", || {
            Err(HousingError::Backend("ERROR boom\n".to_string()))
        })
        .unwrap_err();
    assert!(matches!(err, HousingError::Backend(ref frame) if frame == "ERROR boom\n"));
    assert_eq!(cache.get("SEARCH city=Irvine"), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_panicking_compute_releases_key() {
    let cache = Arc::new(QueryCache::new());

    let worker = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            let _ = cache.get_or_compute("LIST", || panic!("backend exploded"));
        })
    };
    assert!(worker.join().is_err());

    let (value, outcome) = cache.get_or_compute("LIST", || Ok("ok".to_string())).unwrap();
    assert_eq!(value, "ok");
    assert_eq!(outcome, CacheOutcome::Miss);
}

#[test]
fn test_stats() {
    let cache = QueryCache::new();
    assert_eq!(cache.stats(), CacheStats::default());

    cache.get_or_compute("LIST", || Ok("a".to_string())).unwrap();
    cache.get_or_compute("LIST", || Ok("b".to_string())).unwrap();
    cache.get_or_compute("SEARCH", || Ok("c".to_string())).unwrap();

    assert_eq!(
        cache.stats(),
        CacheStats {
            entries: 2,
            hits: 1,
            misses: 2,
        }
    );
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_identical_misses_compute_once() {
    let cache = Arc::new(QueryCache::new());
    let computations = Arc::new(AtomicUsize::new(0));
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let computations = Arc::clone(&computations);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache
                    .get_or_compute("SEARCH city=LongBeach", || {
                        computations.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(100));
                        Ok("OK RESULT 0\nEND\n".to_string())
                    })
                    .unwrap()
                    .0
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "OK RESULT 0\nEND\n");
    }
    assert_eq!(computations.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_waiter_takes_over_after_failure() {
    let cache = Arc::new(QueryCache::new());
    let attempts = Arc::new(AtomicUsize::new(0));
    let threads = 4;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let attempts = Arc::clone(&attempts);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get_or_compute("LIST", || {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    if attempt == 0 {
                        Err(HousingError::BackendUnavailable("refused".to_string()))
                    } else {
                        Ok("OK RESULT 0\nEND\n".to_string())
                    }
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let failures = results.iter().filter(|r| r.is_err()).count();

    // Only the first computation fails; everyone else gets the retried value
    assert_eq!(failures, 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(cache.get("LIST").as_deref(), Some("OK RESULT 0\nEND\n"));
}

#[test]
fn test_distinct_keys_do_not_block_each_other() {
    let cache = Arc::new(QueryCache::new());

    let slow = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            cache
                .get_or_compute("LIST", || {
                    thread::sleep(Duration::from_millis(300));
                    Ok("slow".to_string())
                })
                .unwrap()
        })
    };

    thread::sleep(Duration::from_millis(50));
    let start = std::time::Instant::now();
    let (value, _) = cache
        .get_or_compute("SEARCH city=Irvine", || Ok("fast".to_string()))
        .unwrap();
    assert_eq!(value, "fast");
    assert!(start.elapsed() < Duration::from_millis(250));

    assert_eq!(slow.join().unwrap().0, "slow");
}
