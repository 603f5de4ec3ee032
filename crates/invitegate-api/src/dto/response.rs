//! Response DTOs and the uniform envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use invitegate_entity::invite::model::InviteCode;

/// Uniform response envelope.
///
/// Success is `failed = false, code = 0, message = "ok"`. Errors carry
/// the HTTP status in `code` and a human-readable `message`, with no
/// `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T: Serialize> {
    /// Whether the request failed.
    pub failed: bool,
    /// 0 on success, the HTTP status on failure.
    pub code: u16,
    /// "ok" on success, the error message on failure.
    pub message: String,
    /// Payload, absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiEnvelope<T> {
    /// Wrap a successful payload.
    pub fn ok(data: T) -> Self {
        Self {
            failed: false,
            code: 0,
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Build an error envelope.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            failed: true,
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Invite code representation returned by issue and redeem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteResponse {
    /// Unique identifier.
    pub id: Uuid,
    /// Display form of the code (`XXXX-XXXX`).
    pub code: String,
    /// Issuer identity.
    pub created_by: String,
    /// Maximum number of redemptions.
    pub max_uses: i32,
    /// Redemptions so far.
    pub current_uses: i32,
    /// Uses left.
    pub remaining_uses: i32,
    /// Whether the code can still be redeemed.
    pub is_active: bool,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl InviteResponse {
    /// Build from an entity, rendering the code in display form.
    pub fn from_invite(invite: InviteCode, display_code: String) -> Self {
        Self {
            id: invite.id,
            code: display_code,
            created_by: invite.created_by,
            max_uses: invite.max_uses,
            current_uses: invite.current_uses,
            remaining_uses: invite.max_uses - invite.current_uses,
            is_active: invite.is_active,
            expires_at: invite.expires_at,
            created_at: invite.created_at,
        }
    }
}

/// Basic health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Detailed health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status: "ok" or "degraded".
    pub status: String,
    /// Database reachability.
    pub database: String,
    /// Cache reachability.
    pub cache: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiEnvelope::ok(42)).unwrap();
        assert_eq!(body["failed"], false);
        assert_eq!(body["code"], 0);
        assert_eq!(body["message"], "ok");
        assert_eq!(body["data"], 42);
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let body = serde_json::to_value(ApiEnvelope::<()>::error(409, "used up")).unwrap();
        assert_eq!(body["failed"], true);
        assert_eq!(body["code"], 409);
        assert_eq!(body["message"], "used up");
        assert!(body.get("data").is_none());
    }
}
