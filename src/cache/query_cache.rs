//! Query cache implementation
//!
//! HashMap-based cache with single-flight miss handling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::error::Result;
use super::{CacheOutcome, CacheStats};

/// State of one key
#[derive(Debug)]
enum Slot {
    /// A request is computing this key; others wait on `ready`
    Pending,

    /// Final response text
    Ready(String),
}

/// Concurrency-safe map from command text to response text
///
/// Keys are used exactly as given. No normalization, eviction or TTL.
/// Only successful computations are stored.
#[derive(Debug, Default)]
pub struct QueryCache {
    slots: Mutex<HashMap<String, Slot>>,
    ready: Condvar,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached response
    ///
    /// Does not wait for in-flight computations.
    pub fn get(&self, key: &str) -> Option<String> {
        let slots = self.slots.lock();
        match slots.get(key) {
            Some(Slot::Ready(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value.clone())
            }
            _ => None,
        }
    }

    /// Store a response, replacing any previous value
    pub fn put(&self, key: String, value: String) {
        self.slots.lock().insert(key, Slot::Ready(value));
        self.ready.notify_all();
    }

    /// Return the cached value for `key`, or compute and store it
    ///
    /// The first caller to miss runs `compute`; concurrent callers for the
    /// same key block until it finishes and then see its value. If `compute`
    /// fails nothing is stored, the error goes to that caller only, and one
    /// of the waiters takes over the computation.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<(String, CacheOutcome)>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut slots = self.slots.lock();
        loop {
            match slots.get(key) {
                Some(Slot::Ready(value)) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok((value.clone(), CacheOutcome::Hit));
                }
                Some(Slot::Pending) => {}
                None => break,
            }
            self.ready.wait(&mut slots);
        }
        slots.insert(key.to_string(), Slot::Pending);
        self.misses.fetch_add(1, Ordering::Relaxed);
        drop(slots);

        let guard = PendingGuard { cache: self, key };
        let value = compute()?;
        guard.complete(value.clone());

        Ok((value, CacheOutcome::Miss))
    }

    /// Number of stored responses
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    /// True if no responses are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of entry count and hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Clears a `Pending` slot if the computation fails or panics
struct PendingGuard<'a> {
    cache: &'a QueryCache,
    key: &'a str,
}

impl PendingGuard<'_> {
    fn complete(self, value: String) {
        self.cache
            .slots
            .lock()
            .insert(self.key.to_string(), Slot::Ready(value));
        self.cache.ready.notify_all();
        std::mem::forget(self);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.cache.slots.lock();
        if matches!(slots.get(self.key), Some(Slot::Pending)) {
            slots.remove(self.key);
        }
        drop(slots);
        self.cache.ready.notify_all();
    }
}
