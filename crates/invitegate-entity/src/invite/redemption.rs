//! Redemption entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single consumed use of an invite code.
///
/// Append-only. The `identity` column carries a global uniqueness
/// constraint: an identity may redeem at most one code across the entire
/// corpus, not just within one code.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Redemption {
    /// Unique identifier.
    pub id: Uuid,
    /// The invite code this redemption consumed a use of.
    pub invite_id: Uuid,
    /// The redeeming identity (e.g. email). Globally unique.
    pub identity: String,
    /// Network origin of the redemption request.
    pub origin: String,
    /// When the redemption was committed.
    pub redeemed_at: DateTime<Utc>,
}
