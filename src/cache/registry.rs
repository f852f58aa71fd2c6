//! Cache Registry Module
//!
//! Type-erased control surface over named memoisation caches.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{CacheStats, MemoCache};
use crate::config::Strategy;

// == Cache Control ==
/// Operations available on any cache regardless of its argument and result
/// types.
pub trait CacheControl: Send + Sync {
    fn name(&self) -> &str;
    fn strategy(&self) -> Strategy;
    fn stats(&self) -> CacheStats;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn invalidate_containing(&self, needle: &str) -> usize;
    fn clear(&self) -> usize;
}

impl<A, T, E> CacheControl for MemoCache<A, T, E>
where
    A: Send + 'static,
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        MemoCache::name(self)
    }

    fn strategy(&self) -> Strategy {
        MemoCache::strategy(self)
    }

    fn stats(&self) -> CacheStats {
        MemoCache::stats(self)
    }

    fn len(&self) -> usize {
        MemoCache::len(self)
    }

    fn invalidate_containing(&self, needle: &str) -> usize {
        MemoCache::invalidate_containing(self, needle)
    }

    fn clear(&self) -> usize {
        MemoCache::clear(self)
    }
}

// == Cache Registry ==
/// Named set of caches shared by the inspection server and the stats
/// reporter.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<RwLock<BTreeMap<String, Arc<dyn CacheControl>>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cache under its own name, replacing any previous one.
    pub async fn register(&self, cache: Arc<dyn CacheControl>) {
        let name = cache.name().to_string();
        info!("registered cache {} ({})", name, cache.strategy());
        self.caches.write().await.insert(name, cache);
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn CacheControl>> {
        self.caches.read().await.get(name).cloned()
    }

    /// Registered names in sorted order.
    pub async fn names(&self) -> Vec<String> {
        self.caches.read().await.keys().cloned().collect()
    }

    /// Every registered cache, sorted by name.
    pub async fn snapshot(&self) -> Vec<Arc<dyn CacheControl>> {
        self.caches.read().await.values().cloned().collect()
    }
}
