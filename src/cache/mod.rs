//! Cache Module
//!
//! Single-flight async memoisation with unbounded, LRU and TTL strategies.

mod entry;
mod key;
mod lru;
mod memo;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{
    derive_key, ByIdentity, CacheArgs, KeyBuilder, KeyPolicy, KeyRepr, DEFAULT_IGNORED_NAMES,
    KEY_DELIMITER,
};
pub use lru::LruTracker;
pub use memo::{MemoCache, MemoCacheBuilder, ResultHandle};
pub use registry::{CacheControl, CacheRegistry};
pub use stats::CacheStats;
pub use store::EntryTable;
