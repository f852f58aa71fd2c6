//! Error types for the memoisation cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for cache construction and the inspection server.
///
/// Producer failures never pass through this type unless the producer itself
/// chose `CacheError` as its error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Strategy or environment configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Named cache or entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache crate.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CacheError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                CacheError::InvalidConfig("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_display_includes_detail() {
        let err = CacheError::InvalidConfig("capacity must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: capacity must be positive"
        );
    }
}
