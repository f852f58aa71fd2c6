//! Cache Statistics Module
//!
//! Tracks hit, miss and removal counters of a memoisation cache.

use serde::Serialize;

// == Cache Stats ==
/// Cumulative cache counters.
///
/// Counters are tracked for every strategy, including unbounded and timed
/// caches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls served by an existing handle
    pub hits: u64,
    /// Calls that started the producer
    pub misses: u64,
    /// Entries dropped by the LRU capacity bound
    pub evictions: u64,
    /// Entries purged after outliving their TTL
    pub expirations: u64,
    /// Entries removed through explicit invalidation
    pub invalidations: u64,
    /// Current number of live entries
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// The `(hits, misses)` pair.
    pub fn hit_miss(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
