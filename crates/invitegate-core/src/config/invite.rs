//! Invite code format and redemption configuration.

use serde::{Deserialize, Serialize};

/// Invite code settings: alphabet, checksum salt, lease TTL, and
/// issuance bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteConfig {
    /// Code alphabet. Excludes visually ambiguous symbols (0/O, 1/l/I).
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
    /// Deployment-specific checksum salt. Changing it invalidates every
    /// code issued under the previous value.
    #[serde(default = "default_salt")]
    pub checksum_salt: String,
    /// Per-code lease TTL in seconds.
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,
    /// Maximum attempts to generate a collision-free code before failing.
    #[serde(default = "default_max_attempts")]
    pub max_generation_attempts: u32,
    /// Upper bound accepted for `max_uses` at issuance.
    #[serde(default = "default_max_uses_limit")]
    pub max_uses_limit: i32,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            checksum_salt: default_salt(),
            lock_ttl_seconds: default_lock_ttl(),
            max_generation_attempts: default_max_attempts(),
            max_uses_limit: default_max_uses_limit(),
        }
    }
}

fn default_alphabet() -> String {
    "K7Q2N5XR8BMVY9CW3PFGJH6DZT4SL".to_string()
}

fn default_salt() -> String {
    "ChangeMeInProduction".to_string()
}

fn default_lock_ttl() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    10
}

fn default_max_uses_limit() -> i32 {
    100
}
