//! Health check handlers.

use axum::Json;
use axum::extract::State;

use invitegate_core::traits::cache::CacheProvider;

use crate::dto::response::{ApiEnvelope, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<ApiEnvelope<HealthResponse>> {
    Json(ApiEnvelope::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiEnvelope<DetailedHealthResponse>> {
    let database = match invitegate_database::connection::health_check(&state.db_pool).await {
        Ok(true) => "connected",
        _ => "unreachable",
    };
    let cache = match state.cache.health_check().await {
        Ok(true) => "connected",
        _ => "unreachable",
    };

    let status = if database == "connected" && cache == "connected" {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiEnvelope::ok(DetailedHealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        cache: cache.to_string(),
    }))
}
