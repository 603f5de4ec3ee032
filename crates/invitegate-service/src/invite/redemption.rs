//! The redemption engine: validate, lease, check, atomically consume.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use invitegate_cache::keys;
use invitegate_cache::lock::LockManager;
use invitegate_cache::provider::CacheManager;
use invitegate_codec::InviteCodec;
use invitegate_core::error::{AppError, ErrorKind};
use invitegate_core::result::AppResult;
use invitegate_core::traits::cache::CacheProvider;
use invitegate_database::store::InviteStore;
use invitegate_entity::invite::model::InviteCode;

/// Result of a non-consuming validity check.
///
/// Deliberately coarse: it reports whether the code could be redeemed
/// right now, without revealing which specific rule failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeValidation {
    /// The code in display form (`XXXX-XXXX`).
    pub code: String,
    /// Whether a redemption attempt would currently be accepted.
    pub valid: bool,
    /// Uses left, when the code exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_uses: Option<i32>,
    /// Expiry timestamp, when the code exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service that consumes invite code uses.
///
/// Every consuming attempt runs under a short-TTL per-code lease, so at
/// most one redemption per code is in flight at a time. The database's
/// conditional update is the second, independent line of defense against
/// lost updates.
#[derive(Clone)]
pub struct RedemptionService {
    store: Arc<dyn InviteStore>,
    cache: Arc<CacheManager>,
    locks: Arc<LockManager>,
    codec: Arc<InviteCodec>,
    cache_ttl: Duration,
}

impl RedemptionService {
    /// Create a new redemption service.
    pub fn new(
        store: Arc<dyn InviteStore>,
        cache: Arc<CacheManager>,
        locks: Arc<LockManager>,
        codec: Arc<InviteCodec>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            locks,
            codec,
            cache_ttl,
        }
    }

    /// Redeem one use of `code` for `identity`.
    ///
    /// Rule order is fixed: format, lease, exhaustion, expiry, identity
    /// uniqueness, then the atomic consume. Returns the updated invite
    /// record on success.
    pub async fn redeem(&self, code: &str, identity: &str, origin: &str) -> AppResult<InviteCode> {
        // Checksum screening happens before any store access, so the
        // overwhelming majority of typos and guesses never reach the
        // database.
        let normalized = self.codec.normalize(code);
        if !self.codec.validate(&normalized) {
            return Err(AppError::invalid_format(
                "Invite code is malformed or fails its checksum",
            ));
        }

        let identity = identity.trim().to_lowercase();
        if identity.is_empty() {
            return Err(AppError::validation("Redeemer identity is required"));
        }

        let lock_key = keys::invite_lock(&normalized);
        let token = self.locks.acquire(&lock_key).await?.ok_or_else(|| {
            AppError::contended(format!(
                "Invite '{}' is being redeemed by another request; retry shortly",
                self.codec.format(&normalized)
            ))
        })?;

        let result = self.redeem_locked(&normalized, &identity, origin).await;

        // Invalidate while still holding the lease, so no reader can
        // repopulate the entry from a pre-update snapshot. Failed attempts
        // invalidate too: a concurrent validity check may have cached the
        // record mid-flight.
        if let Err(e) = self.cache.delete(&keys::invite_by_code(&normalized)).await {
            warn!(code = %normalized, error = %e, "failed to invalidate cached invite");
        }
        self.locks.release(&lock_key, &token).await;

        match &result {
            Ok(updated) => info!(
                code = %updated.code,
                current_uses = updated.current_uses,
                max_uses = updated.max_uses,
                "invite redeemed"
            ),
            Err(e) => debug!(code = %normalized, kind = %e.kind, "redemption rejected"),
        }

        result
    }

    /// The lease-protected portion of a redemption.
    async fn redeem_locked(
        &self,
        normalized: &str,
        identity: &str,
        origin: &str,
    ) -> AppResult<InviteCode> {
        let invite = match self.cached_invite(normalized).await {
            Some(invite) => invite,
            None => self
                .store
                .find_by_code(normalized)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!(
                        "Invite code '{}' does not exist",
                        self.codec.format(normalized)
                    ))
                })?,
        };

        if invite.is_exhausted() {
            return Err(AppError::max_uses_reached(format!(
                "Invite '{}' has consumed all {} uses",
                invite.code, invite.max_uses
            )));
        }
        if invite.is_expired_at(Utc::now()) {
            return Err(AppError::expired(format!(
                "Invite '{}' expired at {}",
                invite.code, invite.expires_at
            )));
        }
        // Identity uniqueness is global across all codes, so it must be
        // answered by the durable store; the per-code cache cannot see it.
        if self.store.find_by_redeemer(identity).await?.is_some() {
            return Err(AppError::identity_already_redeemed(format!(
                "Identity '{identity}' has already redeemed an invite"
            )));
        }

        // Under a held lease the conditional update only misses when the
        // snapshot was stale (e.g. a cache entry that outlived an
        // invalidation). Surface it as transient so the caller retries
        // against fresh state.
        self.store
            .conditional_redeem(&invite, identity, origin)
            .await
            .map_err(|e| {
                if e.kind == ErrorKind::Conflict {
                    AppError::contended(format!(
                        "Invite '{}' changed concurrently; retry shortly",
                        invite.code
                    ))
                } else {
                    e
                }
            })
    }

    /// Non-consuming validity check, read-through cached.
    ///
    /// Malformed codes are reported as invalid without touching any
    /// backing store. Unlike [`redeem`](Self::redeem), this does not take
    /// the lease: a mildly stale answer is acceptable for a preview.
    pub async fn validate_only(&self, code: &str) -> AppResult<CodeValidation> {
        let normalized = self.codec.normalize(code);
        if !self.codec.validate(&normalized) {
            return Ok(CodeValidation {
                code: code.trim().to_string(),
                valid: false,
                remaining_uses: None,
                expires_at: None,
            });
        }

        let invite = match self.cached_invite(&normalized).await {
            Some(invite) => Some(invite),
            None => {
                let loaded = self.store.find_by_code(&normalized).await?;
                if let Some(ref invite) = loaded {
                    // Populate on miss; a cache fault only costs the next
                    // reader a database round trip.
                    if let Err(e) = self
                        .cache
                        .set_json(&keys::invite_by_code(&normalized), invite, self.cache_ttl)
                        .await
                    {
                        debug!(code = %normalized, error = %e, "failed to populate invite cache");
                    }
                }
                loaded
            }
        };

        let display = self.codec.format(&normalized);
        Ok(match invite {
            Some(invite) => {
                let now = Utc::now();
                let valid =
                    invite.is_active && !invite.is_exhausted() && !invite.is_expired_at(now);
                CodeValidation {
                    code: display,
                    valid,
                    remaining_uses: Some(invite.max_uses - invite.current_uses),
                    expires_at: Some(invite.expires_at),
                }
            }
            None => CodeValidation {
                code: display,
                valid: false,
                remaining_uses: None,
                expires_at: None,
            },
        })
    }

    /// Read the cached invite, treating any cache fault as a miss.
    async fn cached_invite(&self, normalized: &str) -> Option<InviteCode> {
        match self
            .cache
            .get_json::<InviteCode>(&keys::invite_by_code(normalized))
            .await
        {
            Ok(hit) => hit,
            Err(e) => {
                debug!(code = %normalized, error = %e, "cache read failed; treating as miss");
                None
            }
        }
    }
}
