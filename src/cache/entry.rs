//! Cache Entry Module
//!
//! Defines the immutable key slot holding a shared result handle.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single slot of the key→handle table.
///
/// Entries are never mutated; replacing a value means removing the entry and
/// inserting a new one under the same key.
#[derive(Debug, Clone)]
pub struct CacheEntry<H> {
    /// Shared handle returned to every caller of this key
    pub handle: H,
    /// Monotonic insertion time
    pub inserted_at: Instant,
}

impl<H> CacheEntry<H> {
    // == Constructor ==
    /// Creates a new entry stamped with the current monotonic time.
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            inserted_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed since the entry was inserted.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.inserted_at)
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl`.
    ///
    /// An entry aged exactly `ttl` is still live; only a strictly greater age
    /// expires it.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}
