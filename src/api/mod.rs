//! API Module
//!
//! HTTP handlers and routing for the cache inspection server.
//!
//! # Endpoints
//! - `GET /lookup/:name` - Memoised demo lookup
//! - `GET /stats` - Stats of every registered cache
//! - `GET /stats/:name` - Stats of one cache
//! - `POST /invalidate` - Drop entries by substring, or clear a cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
