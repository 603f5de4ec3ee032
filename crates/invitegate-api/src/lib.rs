//! # invitegate-api
//!
//! HTTP API layer for Invitegate built on Axum.
//!
//! Provides the REST endpoints, middleware (rate limiting, CORS,
//! logging), DTOs, and the mapping from domain errors to the uniform
//! response envelope.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
