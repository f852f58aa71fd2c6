//! Response DTOs for the inspection API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheControl;

/// Stats of one registered cache (GET /stats, GET /stats/:name)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Registered cache name
    pub name: String,
    /// Strategy in display form, e.g. `lru(128)`
    pub strategy: String,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
    /// Current number of live entries
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Captures the current stats of a cache
    pub fn from_cache(cache: &dyn CacheControl) -> Self {
        let stats = cache.stats();
        Self {
            name: cache.name().to_string(),
            strategy: cache.strategy().to_string(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Stats of every registered cache (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsListResponse {
    pub caches: Vec<StatsResponse>,
}

/// Response body for POST /invalidate
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Cache the entries were removed from
    pub cache: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(cache: impl Into<String>, removed: usize) -> Self {
        Self {
            cache: cache.into(),
            removed,
        }
    }
}

/// Result of the demo lookup (GET /lookup/:name)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResponse {
    /// Name as requested
    pub name: String,
    /// Canonical lowercase form
    pub canonical: String,
    /// When the upstream resolved it, in ISO 8601 format
    pub resolved_at: String,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
