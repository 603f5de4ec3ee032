//! In-memory cache and lease store for development and tests.

pub mod lock;
pub mod store;

pub use lock::MemoryLockStore;
pub use store::MemoryCacheProvider;
