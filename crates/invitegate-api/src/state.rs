//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use invitegate_cache::provider::CacheManager;
use invitegate_codec::InviteCodec;
use invitegate_core::config::AppConfig;
use invitegate_service::{IssuanceService, RedemptionService, StatsService};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool
    pub db_pool: PgPool,
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,
    /// Invite code codec
    pub codec: Arc<InviteCodec>,
    /// Issuance service
    pub issuance: Arc<IssuanceService>,
    /// Redemption service
    pub redemption: Arc<RedemptionService>,
    /// Stats service
    pub stats: Arc<StatsService>,
    /// Redeem endpoint rate limiter
    pub rate_limiter: Arc<RateLimiter>,
}
