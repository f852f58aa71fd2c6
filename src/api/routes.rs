//! API Routes
//!
//! Configures the Axum router with all inspection server endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, health_handler, invalidate_handler, lookup_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /lookup/:name` - Memoised demo lookup
/// - `GET /stats` - Stats of every registered cache
/// - `GET /stats/:name` - Stats of one cache
/// - `POST /invalidate` - Drop entries by substring, or clear a cache
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/lookup/:name", get(lookup_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/:name", get(cache_stats_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
