//! In-memory lease store using dashmap.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use invitegate_core::result::AppResult;
use invitegate_core::traits::lock::LockStore;

/// A lease entry: holder token and absolute deadline.
#[derive(Debug, Clone)]
struct Lease {
    token: String,
    expires_at: Instant,
}

/// In-memory lease store.
///
/// The dashmap entry API holds the shard lock for the duration of the
/// check-or-insert, so `set_if_absent` is atomic. Expired leases are
/// reclaimed lazily on the next acquisition attempt rather than by a
/// background sweeper.
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    leases: DashMap<String, Lease>,
}

impl MemoryLockStore {
    /// Create an empty lease store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        let lease = Lease {
            token: value.to_string(),
            expires_at: now + ttl,
        };

        match self.leases.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().expires_at <= now {
                    occupied.insert(lease);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(lease);
                Ok(true)
            }
        }
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let removed = self
            .leases
            .remove_if(key, |_, lease| lease.token == expected);
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_if_absent_rejects_live_lease() {
        let store = MemoryLockStore::new();
        assert!(
            store
                .set_if_absent("k", "a", Duration::from_secs(5))
                .await
                .unwrap()
        );
        assert!(
            !store
                .set_if_absent("k", "b", Duration::from_secs(5))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_expired_lease_is_replaced() {
        let store = MemoryLockStore::new();
        assert!(
            store
                .set_if_absent("k", "a", Duration::from_millis(10))
                .await
                .unwrap()
        );
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(
            store
                .set_if_absent("k", "b", Duration::from_secs(5))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_compare_and_delete_requires_matching_token() {
        let store = MemoryLockStore::new();
        store
            .set_if_absent("k", "a", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!store.compare_and_delete("k", "b").await.unwrap());
        assert!(store.compare_and_delete("k", "a").await.unwrap());
        assert!(!store.compare_and_delete("k", "a").await.unwrap());
    }
}
