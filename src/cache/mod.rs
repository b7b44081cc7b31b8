//! Cache Module
//!
//! Query cache held by the app server.
//!
//! ## Responsibilities
//! - Map exact command text to a final, ranked, encoded response
//! - Serve repeats without a backend round trip
//! - Coalesce concurrent identical misses (single flight)
//!
//! ## Data Structure Choice
//! HashMap behind a parking_lot Mutex plus a Condvar for waiters on an
//! in-flight computation. Entries are never evicted.

mod query_cache;

pub use query_cache::QueryCache;

/// Whether a lookup was served from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Value was already cached, or computed by a concurrent request we waited on
    Hit,

    /// Value was computed by this call and stored
    Miss,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}
