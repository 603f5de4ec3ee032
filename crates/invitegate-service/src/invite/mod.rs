//! Invite code services.

pub mod issuance;
pub mod redemption;
pub mod stats;
