//! Request and Response models for the inspection API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::InvalidateRequest;
pub use responses::{
    ErrorResponse, HealthResponse, InvalidateResponse, LookupResponse, StatsListResponse,
    StatsResponse,
};
