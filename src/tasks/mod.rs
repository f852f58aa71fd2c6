//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Stats reporter: Logs the counters of every registered cache
//!
//! No task evicts entries; TTL expiry stays lazy.

mod reporter;

pub use reporter::spawn_stats_reporter;
