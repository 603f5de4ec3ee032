//! Short-TTL mutual-exclusion lease manager, keyed by invite code.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use invitegate_core::config::cache::CacheConfig;
use invitegate_core::error::AppError;
use invitegate_core::result::AppResult;
use invitegate_core::traits::lock::LockStore;

/// Manages per-code leases over a [`LockStore`].
///
/// A lease is granted with a unique holder token and expires after its TTL
/// even if never released, which is the primary defense against crashed
/// holders. Release only succeeds while the stored token still matches, so
/// a slow caller can never delete a lease it no longer owns.
#[derive(Debug, Clone)]
pub struct LockManager {
    /// The backing lease store.
    store: Arc<dyn LockStore>,
    /// Lease lifetime.
    ttl: Duration,
}

impl LockManager {
    /// Create a lock manager over an existing store.
    pub fn new(store: Arc<dyn LockStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Create a lock manager from configuration, selecting the same
    /// backend family as the cache.
    pub async fn from_config(config: &CacheConfig, ttl: Duration) -> AppResult<Self> {
        let store: Arc<dyn LockStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis lease store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisLockStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory lease store");
                Arc::new(crate::memory::MemoryLockStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown lock store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self::new(store, ttl))
    }

    /// Attempt to acquire the lease for `key`.
    ///
    /// Returns the holder token on success, or `None` when another holder's
    /// lease is live. Store failures propagate so callers can distinguish
    /// "busy" from "lock store down".
    pub async fn acquire(&self, key: &str) -> AppResult<Option<String>> {
        let token = Uuid::new_v4().to_string();
        if self.store.set_if_absent(key, &token, self.ttl).await? {
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }

    /// Release the lease for `key` if `token` still holds it.
    ///
    /// Never propagates errors: a token mismatch means the lease already
    /// expired and was reassigned (the TTL is the safety net), and a store
    /// failure will resolve itself the same way.
    pub async fn release(&self, key: &str, token: &str) {
        match self.store.compare_and_delete(key, token).await {
            Ok(true) => {}
            Ok(false) => debug!(key, "lease already expired or reassigned"),
            Err(e) => warn!(key, error = %e, "failed to release lease; TTL will reclaim it"),
        }
    }

    /// The configured lease TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::memory::MemoryLockStore;

    fn manager(ttl: Duration) -> LockManager {
        LockManager::new(Arc::new(MemoryLockStore::new()), ttl)
    }

    #[tokio::test]
    async fn test_acquire_is_exclusive() {
        let locks = manager(Duration::from_secs(5));
        let token = locks.acquire("invite:lock:AAAA").await.unwrap();
        assert!(token.is_some());
        assert!(locks.acquire("invite:lock:AAAA").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_release_frees_the_lease() {
        let locks = manager(Duration::from_secs(5));
        let token = locks.acquire("invite:lock:BBBB").await.unwrap().unwrap();
        locks.release("invite:lock:BBBB", &token).await;
        assert!(locks.acquire("invite:lock:BBBB").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_stale_token_release_is_a_noop() {
        let locks = manager(Duration::from_secs(5));
        let _token = locks.acquire("invite:lock:CCCC").await.unwrap().unwrap();
        locks.release("invite:lock:CCCC", "not-the-token").await;
        // The live lease must survive a mismatched release.
        assert!(locks.acquire("invite:lock:CCCC").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_lease_is_reclaimable() {
        let locks = manager(Duration::from_millis(20));
        let _token = locks.acquire("invite:lock:DDDD").await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(locks.acquire("invite:lock:DDDD").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let locks = manager(Duration::from_secs(5));
        assert!(locks.acquire("invite:lock:EEEE").await.unwrap().is_some());
        assert!(locks.acquire("invite:lock:FFFF").await.unwrap().is_some());
    }
}
