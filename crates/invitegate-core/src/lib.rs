//! # invitegate-core
//!
//! Core crate for Invitegate. Contains configuration schemas, the trait
//! seams for the cache and lock stores, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Invitegate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
