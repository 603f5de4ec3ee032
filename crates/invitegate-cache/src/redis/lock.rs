//! Redis-backed lease store.

use std::time::Duration;

use async_trait::async_trait;
use redis::Script;

use invitegate_core::error::{AppError, ErrorKind};
use invitegate_core::result::AppResult;
use invitegate_core::traits::lock::LockStore;

use super::client::RedisClient;

/// Lua script deleting a key only while it still holds the expected token.
/// GET + DEL run atomically inside the script, closing the window in which
/// a lease could expire and be reassigned between the two calls.
const COMPARE_AND_DELETE: &str = r#"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
"#;

/// Redis-backed lease store using `SET NX PX` and a check-and-delete script.
#[derive(Debug, Clone)]
pub struct RedisLockStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisLockStore {
    /// Create a new Redis lease store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::ServiceUnavailable, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        // SET key value PX ttl NX -- a single atomic operation; Redis
        // reclaims expired keys itself, so no expiry check is needed here.
        let result: Option<String> = redis::cmd("SET")
            .arg(&full_key)
            .arg(value)
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(result.is_some())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        let deleted: i64 = Script::new(COMPARE_AND_DELETE)
            .key(&full_key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(deleted == 1)
    }
}
