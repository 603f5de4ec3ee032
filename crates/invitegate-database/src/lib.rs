//! # invitegate-database
//!
//! PostgreSQL connection management, migrations, and the durable invite
//! store. The [`store::InviteStore`] trait is the persistence seam the
//! service layer depends on; [`repositories::invite::InviteRepository`]
//! is its sqlx implementation.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use store::InviteStore;
