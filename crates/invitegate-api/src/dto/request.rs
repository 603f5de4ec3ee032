//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Issue a new invite code.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueInviteRequest {
    /// Issuer identity (e.g. email).
    #[validate(length(min = 1, max = 255, message = "created_by is required"))]
    pub created_by: String,
    /// Maximum number of redemptions.
    #[validate(range(min = 1, message = "max_uses must be at least 1"))]
    pub max_uses: i32,
    /// Days until the code expires.
    #[validate(range(
        min = 1,
        max = 3650,
        message = "expires_in_days must be between 1 and 3650"
    ))]
    pub expires_in_days: i64,
}

/// Redeem one use of an invite code.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RedeemRequest {
    /// The invite code, with or without separator, any case.
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// The redeeming identity (e.g. email).
    #[validate(length(min = 1, max = 255, message = "identity is required"))]
    pub identity: String,
}

/// Query parameters for the stats endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsParams {
    /// Creator identity to aggregate over.
    pub creator: String,
}
