//! # invitegate-service
//!
//! Business logic service layer for Invitegate. Each service orchestrates
//! the durable store, the cache, the lease manager, and the codec to
//! implement application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references. There are no globals.

pub mod invite;

pub use invite::issuance::IssuanceService;
pub use invite::redemption::{CodeValidation, RedemptionService};
pub use invite::stats::StatsService;
