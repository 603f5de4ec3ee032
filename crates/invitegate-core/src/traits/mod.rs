//! Trait seams for pluggable infrastructure backends.

pub mod cache;
pub mod lock;

pub use cache::CacheProvider;
pub use lock::LockStore;
