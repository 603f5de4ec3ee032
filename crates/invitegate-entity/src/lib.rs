//! # invitegate-entity
//!
//! Domain entity models for Invitegate: invite codes, redemptions, and
//! per-creator statistics.

pub mod invite;

pub use invite::{CreateInvite, InviteCode, InviteStats, Redemption};
