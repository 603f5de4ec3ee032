//! Lock store trait for short-TTL mutual-exclusion leases.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for the shared store backing per-code leases.
///
/// Both operations must be single atomic operations against the store.
/// Implementations must not emulate them with a read-then-write pair
/// across the network.
#[async_trait]
pub trait LockStore: Send + Sync + std::fmt::Debug + 'static {
    /// Set `key` to `value` with a TTL only if the key is absent
    /// (or its previous lease has expired).
    /// Returns `true` if the lease was granted.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete `key` only if its current value equals `expected`.
    /// Returns `true` if the key was deleted. A mismatch means the lease
    /// expired and was reassigned; the caller no longer owns it.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool>;
}
