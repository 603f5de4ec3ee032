//! Invite code entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An invite code with a bounded number of uses.
///
/// `current_uses` and `is_active` are mutated exclusively by the atomic
/// conditional update performed during redemption. `is_active` is derived:
/// it flips to `false` when the last use is consumed and never flips back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InviteCode {
    /// Unique identifier.
    pub id: Uuid,
    /// The normalized 8-symbol code (no separator). Globally unique, immutable.
    pub code: String,
    /// Identity of the issuer (e.g. email). Immutable.
    pub created_by: String,
    /// Maximum number of redemptions. Immutable, set at creation.
    pub max_uses: i32,
    /// Number of successful redemptions so far. Monotonically increasing,
    /// never exceeds `max_uses`.
    pub current_uses: i32,
    /// Whether the code can still be redeemed. False once exhausted.
    pub is_active: bool,
    /// Absolute expiry timestamp. Immutable.
    pub expires_at: DateTime<Utc>,
    /// When the code was created.
    pub created_at: DateTime<Utc>,
    /// When the code was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl InviteCode {
    /// Whether every use has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.current_uses >= self.max_uses
    }

    /// Whether the code is past its expiry at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Fraction of uses consumed, in `0.0..=1.0`.
    pub fn usage_ratio(&self) -> f64 {
        if self.max_uses <= 0 {
            return 0.0;
        }
        f64::from(self.current_uses) / f64::from(self.max_uses)
    }
}

/// Data required to persist a newly issued invite code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvite {
    /// The normalized code string.
    pub code: String,
    /// Identity of the issuer.
    pub created_by: String,
    /// Maximum number of redemptions.
    pub max_uses: i32,
    /// Absolute expiry timestamp.
    pub expires_at: DateTime<Utc>,
}
