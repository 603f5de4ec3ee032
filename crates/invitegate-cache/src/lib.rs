//! # invitegate-cache
//!
//! Cache providers and the per-code lease manager for Invitegate.
//!
//! The same backing store (Redis in production, in-memory for development
//! and tests) serves two distinct roles: a disposable read-through cache
//! of invite records, and the short-TTL mutual-exclusion lease store that
//! serializes redemptions of a single code.

pub mod keys;
pub mod lock;
pub mod provider;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "redis-backend")]
pub mod redis;

pub use lock::LockManager;
pub use provider::CacheManager;
