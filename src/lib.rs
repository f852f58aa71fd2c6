//! Memo Cache - single-flight async memoisation
//!
//! Wraps async producers so concurrent calls with the same arguments share
//! one execution, with unbounded, LRU and TTL eviction strategies.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheArgs, KeyRepr, MemoCache, ResultHandle};
pub use config::{CacheConfig, Config, Strategy};
pub use error::CacheError;
pub use tasks::spawn_stats_reporter;
