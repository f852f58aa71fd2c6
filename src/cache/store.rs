//! Entry Table Module
//!
//! Key→entry mapping that applies the configured eviction strategy.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::config::Strategy;

// == Entry Table ==
/// Strategy-driven table of derived keys to shared handles.
///
/// Under [`Strategy::Timed`] every operation first purges entries older than
/// the TTL, so expiry is observed at the next access and never earlier.
#[derive(Debug)]
pub struct EntryTable<H> {
    entries: HashMap<String, CacheEntry<H>>,
    lru: LruTracker,
    stats: CacheStats,
    strategy: Strategy,
}

impl<H> EntryTable<H> {
    // == Constructor ==
    /// Creates an empty table. The strategy is assumed to be validated.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            strategy,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    // == Get ==
    /// Looks up a live handle, recording a hit or a miss.
    ///
    /// A hit marks the key as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&H> {
        self.purge_expired();

        if self.entries.contains_key(key) {
            self.stats.record_hit();
            if matches!(self.strategy, Strategy::Lru { .. }) {
                self.lru.touch(key);
            }
            self.entries.get(key).map(|entry| &entry.handle)
        } else {
            self.stats.record_miss();
            None
        }
    }

    // == Contains ==
    /// Checks for a live entry without touching recency or counters.
    pub fn contains(&mut self, key: &str) -> bool {
        self.purge_expired();
        self.entries.contains_key(key)
    }

    // == Insert ==
    /// Publishes a handle under `key`, replacing any previous entry.
    ///
    /// With the LRU strategy at capacity, the least recently used key is
    /// evicted first and returned.
    pub fn insert(&mut self, key: String, handle: H) -> Option<String> {
        self.purge_expired();

        let mut evicted = None;
        if let Strategy::Lru { capacity } = self.strategy {
            if !self.entries.contains_key(&key) && self.entries.len() >= capacity {
                if let Some(oldest) = self.lru.evict_oldest() {
                    self.entries.remove(&oldest);
                    self.stats.record_eviction();
                    debug!("lru eviction of {}", oldest);
                    evicted = Some(oldest);
                }
            }
            self.lru.touch(&key);
        }

        self.entries.insert(key, CacheEntry::new(handle));
        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Remove ==
    /// Removes the entry for `key`, reporting whether one was live.
    pub fn remove(&mut self, key: &str) -> bool {
        self.purge_expired();

        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.record_invalidations(1);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Remove Containing ==
    /// Removes every entry whose key contains `needle` as a literal substring.
    ///
    /// Returns the number of entries removed.
    pub fn remove_containing(&mut self, needle: &str) -> usize {
        self.purge_expired();

        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.contains(needle))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_invalidations(matching.len());
        self.stats.set_total_entries(self.entries.len());
        matching.len()
    }

    // == Clear ==
    /// Drops every entry, returning how many were live.
    pub fn clear(&mut self) -> usize {
        self.purge_expired();

        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.stats.record_invalidations(count);
        self.stats.set_total_entries(0);
        count
    }

    // == Keys ==
    /// Live keys in unspecified order.
    pub fn keys(&mut self) -> Vec<String> {
        self.purge_expired();
        self.entries.keys().cloned().collect()
    }

    // == Purge Expired ==
    /// Removes entries that outlived the TTL. A no-op for other strategies.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let Strategy::Timed { ttl } = self.strategy else {
            return 0;
        };

        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before - self.entries.len();

        if removed > 0 {
            debug!("purged {} expired entries", removed);
            self.stats.record_expirations(removed);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    ///
    /// `total_entries` counts live entries only. Expired entries are left in
    /// place for the next mutating operation to purge.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.live_len());
        stats
    }

    fn live_len(&self) -> usize {
        match self.strategy {
            Strategy::Timed { ttl } => self
                .entries
                .values()
                .filter(|entry| !entry.is_expired(ttl))
                .count(),
            _ => self.entries.len(),
        }
    }

    /// Number of entries held, including any not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn lru(capacity: usize) -> EntryTable<u32> {
        EntryTable::new(Strategy::Lru { capacity })
    }

    #[test]
    fn test_table_insert_and_get() {
        let mut table = EntryTable::new(Strategy::Unbounded);

        assert!(table.insert("k".to_string(), 7).is_none());
        assert_eq!(table.get("k"), Some(&7));
        assert_eq!(table.get("missing"), None);
        assert_eq!(table.stats().hit_miss(), (1, 1));
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut table = EntryTable::new(Strategy::Unbounded);

        for i in 0..1000 {
            table.insert(format!("k{i}"), i);
        }

        assert_eq!(table.len(), 1000);
        assert_eq!(table.stats().evictions, 0);
    }

    #[test]
    fn test_lru_eviction_without_reads() {
        let mut table = lru(2);

        table.insert("a".to_string(), 1);
        table.insert("b".to_string(), 2);
        let evicted = table.insert("c".to_string(), 3);

        assert_eq!(evicted.as_deref(), Some("a"));
        assert!(!table.contains("a"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_lru_touch_on_get() {
        let mut table = lru(2);

        table.insert("a".to_string(), 1);
        table.insert("b".to_string(), 2);
        table.insert("c".to_string(), 3);
        assert!(table.get("b").is_some());

        let evicted = table.insert("d".to_string(), 4);
        assert_eq!(evicted.as_deref(), Some("c"));
        assert!(table.contains("b"));
        assert!(table.contains("d"));
        assert_eq!(table.stats().evictions, 2);
    }

    #[test]
    fn test_lru_replace_does_not_evict() {
        let mut table = lru(2);

        table.insert("a".to_string(), 1);
        table.insert("b".to_string(), 2);
        assert!(table.insert("a".to_string(), 10).is_none());

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some(&10));
    }

    #[test]
    fn test_remove() {
        let mut table = lru(4);

        table.insert("a".to_string(), 1);
        assert!(table.remove("a"));
        assert!(!table.remove("a"));
        assert!(table.is_empty());
        assert_eq!(table.stats().invalidations, 1);
    }

    #[test]
    fn test_remove_containing() {
        let mut table = EntryTable::new(Strategy::Unbounded);

        table.insert("fetch:user:42:posts".to_string(), 1);
        table.insert("fetch:user:42".to_string(), 2);
        table.insert("fetch:user:420".to_string(), 3);
        table.insert("fetch:user:7".to_string(), 4);

        assert_eq!(table.remove_containing("user:42:"), 1);
        assert_eq!(table.remove_containing("user:7"), 1);

        let mut keys = table.keys();
        keys.sort();
        assert_eq!(keys, vec!["fetch:user:42", "fetch:user:420"]);
    }

    #[test]
    fn test_clear() {
        let mut table = lru(8);

        table.insert("a".to_string(), 1);
        table.insert("b".to_string(), 2);

        assert_eq!(table.clear(), 2);
        assert!(table.is_empty());
        assert!(table.insert("c".to_string(), 3).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_lazy_expiry() {
        let mut table = EntryTable::new(Strategy::Timed {
            ttl: Duration::from_secs(5),
        });

        table.insert("k".to_string(), 1);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(table.get("k"), Some(&1));

        tokio::time::advance(Duration::from_secs(2)).await;
        // Nothing is purged until the table is touched.
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("k"), None);
        assert_eq!(table.len(), 0);
        assert_eq!(table.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_stats_skip_expired_entries() {
        let mut table = EntryTable::new(Strategy::Timed {
            ttl: Duration::from_secs(5),
        });

        table.insert("old".to_string(), 1);
        tokio::time::advance(Duration::from_secs(3)).await;
        table.insert("new".to_string(), 2);
        tokio::time::advance(Duration::from_secs(3)).await;

        let stats = table.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expirations, 0);
        // Reading stats leaves the expired entry for the next access.
        assert_eq!(table.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_purge_on_write() {
        let mut table = EntryTable::new(Strategy::Timed {
            ttl: Duration::from_secs(1),
        });

        table.insert("old".to_string(), 1);
        tokio::time::advance(Duration::from_secs(2)).await;
        table.insert("new".to_string(), 2);

        assert_eq!(table.len(), 1);
        assert!(table.contains("new"));
    }

    #[test]
    fn test_timed_counters_are_tracked() {
        let mut table = EntryTable::new(Strategy::Timed {
            ttl: Duration::from_secs(60),
        });

        table.insert("k".to_string(), 1);
        table.get("k");
        table.get("other");

        assert_eq!(table.stats().hit_miss(), (1, 1));
    }
}
