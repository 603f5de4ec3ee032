//! Redis-backed cache and lease store.

pub mod client;
pub mod lock;
pub mod operations;

pub use client::RedisClient;
pub use lock::RedisLockStore;
pub use operations::RedisCacheProvider;
