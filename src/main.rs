//! Invitegate Server — invite code issuance and redemption service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use invitegate_core::config::AppConfig;
use invitegate_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("INVITEGATE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Invitegate v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db_pool = invitegate_database::connection::create_pool(&config.database).await?;

    tracing::info!("Running database migrations...");
    invitegate_database::migration::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // ── Cache and lease store ────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(invitegate_cache::provider::CacheManager::new(&config.cache).await?);
    let locks = Arc::new(
        invitegate_cache::lock::LockManager::from_config(
            &config.cache,
            Duration::from_secs(config.invite.lock_ttl_seconds),
        )
        .await?,
    );

    // ── Codec ────────────────────────────────────────────────────
    let codec = Arc::new(invitegate_codec::InviteCodec::new(
        &config.invite.alphabet,
        &config.invite.checksum_salt,
    )?);

    // ── Repositories and services ────────────────────────────────
    let store: Arc<dyn invitegate_database::store::InviteStore> = Arc::new(
        invitegate_database::repositories::invite::InviteRepository::new(db_pool.clone()),
    );

    let cache_ttl = Duration::from_secs(config.cache.default_ttl_seconds);

    let issuance = Arc::new(invitegate_service::IssuanceService::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        Arc::clone(&codec),
        config.invite.clone(),
        cache_ttl,
    ));
    let redemption = Arc::new(invitegate_service::RedemptionService::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        Arc::clone(&locks),
        Arc::clone(&codec),
        cache_ttl,
    ));
    let stats = Arc::new(invitegate_service::StatsService::new(Arc::clone(&store)));

    let rate_limiter = Arc::new(invitegate_api::middleware::rate_limit::RateLimiter::new(
        &config.server.rate_limit,
    ));

    tracing::info!("Services initialized");

    // ── HTTP server ──────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let app_state = invitegate_api::state::AppState {
        config: Arc::new(config),
        db_pool,
        cache,
        codec,
        issuance,
        redemption,
        stats,
        rate_limiter,
    };

    let app = invitegate_api::router::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Invitegate server listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Invitegate server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
