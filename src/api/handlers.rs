//! API Handlers
//!
//! HTTP request handlers for each inspection server endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::{CacheRegistry, MemoCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    HealthResponse, InvalidateRequest, InvalidateResponse, LookupResponse, StatsListResponse,
    StatsResponse,
};

/// Registered name of the demo lookup cache.
pub const LOOKUP_CACHE_NAME: &str = "lookup";

/// Memoised demo lookup keyed by the requested name.
pub type LookupCache = MemoCache<(String,), LookupResponse, CacheError>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Every cache exposed through /stats and /invalidate
    pub registry: CacheRegistry,
    /// Cache behind GET /lookup/:name
    pub lookups: LookupCache,
}

impl AppState {
    /// Builds the lookup cache and registers it.
    pub async fn new(lookups: LookupCache) -> Self {
        let registry = CacheRegistry::new();
        registry.register(Arc::new(lookups.clone())).await;
        Self { registry, lookups }
    }

    /// Creates the state from configuration, failing on an invalid strategy.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let delay = config.lookup_delay();
        let lookups = MemoCache::builder(LOOKUP_CACHE_NAME, move |(name,): (String,)| {
            resolve_lookup(name, delay)
        })
        .config(&config.lookup_cache)
        .build()?;

        Ok(Self::new(lookups).await)
    }
}

/// Simulated slow upstream resolving a name to its canonical form.
///
/// Names outside `[A-Za-z0-9_-]` are rejected; the rejection is cached like
/// any other outcome.
pub async fn resolve_lookup(name: String, delay: Duration) -> Result<LookupResponse> {
    tokio::time::sleep(delay).await;

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(CacheError::InvalidRequest(format!(
            "cannot resolve name: {name}"
        )));
    }

    debug!("upstream resolved {}", name);
    Ok(LookupResponse {
        canonical: name.to_ascii_lowercase(),
        name,
        resolved_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handler for GET /lookup/:name
///
/// Concurrent requests for the same name share one upstream call.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LookupResponse>> {
    let resolved = state.lookups.invoke((name,)).await?;
    Ok(Json(resolved))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsListResponse> {
    let caches = state
        .registry
        .snapshot()
        .await
        .iter()
        .map(|cache| StatsResponse::from_cache(cache.as_ref()))
        .collect();

    Json(StatsListResponse { caches })
}

/// Handler for GET /stats/:name
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let cache = state
        .registry
        .get(&name)
        .await
        .ok_or_else(|| CacheError::NotFound(format!("cache '{name}'")))?;

    Ok(Json(StatsResponse::from_cache(cache.as_ref())))
}

/// Handler for POST /invalidate
///
/// Drops entries whose key contains `contains`, or the whole cache when no
/// substring is given.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state
        .registry
        .get(&req.cache)
        .await
        .ok_or_else(|| CacheError::NotFound(format!("cache '{}'", req.cache)))?;

    let removed = match req.contains.as_deref() {
        Some(needle) => cache.invalidate_containing(needle),
        None => cache.clear(),
    };

    Ok(Json(InvalidateResponse::new(req.cache, removed)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
