//! Invite code entities.

pub mod model;
pub mod redemption;
pub mod stats;

pub use model::{CreateInvite, InviteCode};
pub use redemption::Redemption;
pub use stats::InviteStats;
