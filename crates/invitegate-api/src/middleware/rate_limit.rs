//! Token bucket rate limiter for the redeem endpoint, keyed by client IP.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;

use invitegate_core::config::app::RateLimitConfig;
use invitegate_core::error::{AppError, ErrorKind};

use crate::error::ApiError;
use crate::state::AppState;

/// Once the map grows past this, buckets idle long enough to have fully
/// refilled are dropped so the per-IP state stays bounded.
const SWEEP_THRESHOLD: usize = 1024;

/// Simple in-memory token bucket rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    /// IP → bucket state.
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
    /// Whether limiting is enabled at all.
    enabled: bool,
    /// Maximum tokens per bucket.
    max_tokens: u32,
    /// Token refill rate per second.
    refill_rate: f64,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a rate limiter from configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            enabled: config.enabled,
            max_tokens: config.burst,
            refill_rate: config.per_second,
        }
    }

    /// Attempts to consume a token for the given key.
    pub async fn check(&self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        // A bucket idle for a full refill interval is indistinguishable
        // from a fresh one, so dropping it preserves behavior.
        if buckets.len() > SWEEP_THRESHOLD && self.refill_rate > 0.0 {
            let idle_cutoff = Duration::from_secs_f64(self.max_tokens as f64 / self.refill_rate);
            buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < idle_cutoff);
        }

        let bucket = buckets.entry(key.to_string()).or_insert(TokenBucket {
            tokens: self.max_tokens as f64,
            last_refill: now,
        });

        // Refill tokens
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens as f64);
        bucket.last_refill = now;

        // Try to consume
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Middleware enforcing the limiter on routes it is layered onto.
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = addr.ip().to_string();
    if !state.rate_limiter.check(&key).await {
        return Err(AppError::new(
            ErrorKind::RateLimited,
            "Too many redemption attempts; slow down",
        )
        .into());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(burst: u32, per_second: f64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            burst,
            per_second,
        })
    }

    #[tokio::test]
    async fn test_burst_then_refusal() {
        let limiter = limiter(3, 0.0001);
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").await);
        }
        assert!(!limiter.check("10.0.0.1").await);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1, 0.0001);
        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_idle_buckets_are_swept() {
        // Full refill takes 1ms, so after the sleep every tracked bucket
        // is reclaimable.
        let limiter = limiter(1, 1000.0);
        for n in 0..=SWEEP_THRESHOLD {
            limiter.check(&format!("10.0.{}.{}", n / 256, n % 256)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(limiter.check("10.1.0.1").await);
        assert_eq!(limiter.buckets.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_limiter_always_allows() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            enabled: false,
            burst: 1,
            per_second: 0.0001,
        });
        for _ in 0..10 {
            assert!(limiter.check("10.0.0.1").await);
        }
    }
}
