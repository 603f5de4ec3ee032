//! Invite issuance: bounded collision-free code generation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use invitegate_cache::keys;
use invitegate_cache::provider::CacheManager;
use invitegate_codec::InviteCodec;
use invitegate_core::config::invite::InviteConfig;
use invitegate_core::error::{AppError, ErrorKind};
use invitegate_core::result::AppResult;
use invitegate_core::traits::cache::CacheProvider;
use invitegate_database::store::InviteStore;
use invitegate_entity::invite::model::{CreateInvite, InviteCode};

/// Longest accepted validity window. Also keeps the expiry arithmetic
/// inside chrono's `TimeDelta` bounds, which panic on overflow.
pub const MAX_EXPIRES_IN_DAYS: i64 = 3650;

/// Service that mints new invite codes.
#[derive(Clone)]
pub struct IssuanceService {
    store: Arc<dyn InviteStore>,
    cache: Arc<CacheManager>,
    codec: Arc<InviteCodec>,
    config: InviteConfig,
    cache_ttl: Duration,
}

impl IssuanceService {
    /// Create a new issuance service.
    pub fn new(
        store: Arc<dyn InviteStore>,
        cache: Arc<CacheManager>,
        codec: Arc<InviteCodec>,
        config: InviteConfig,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            codec,
            config,
            cache_ttl,
        }
    }

    /// Issue a new invite code.
    ///
    /// Generates candidate codes until one inserts without colliding with
    /// an existing row, bounded by `max_generation_attempts`. The database
    /// UNIQUE constraint is the arbiter; the pre-insert lookup only saves
    /// a wasted insert on the common path.
    pub async fn issue(
        &self,
        created_by: &str,
        max_uses: i32,
        expires_in_days: i64,
    ) -> AppResult<InviteCode> {
        let created_by = created_by.trim();
        if created_by.is_empty() {
            return Err(AppError::validation("Issuer identity is required"));
        }
        if max_uses < 1 || max_uses > self.config.max_uses_limit {
            return Err(AppError::validation(format!(
                "max_uses must be between 1 and {}",
                self.config.max_uses_limit
            )));
        }
        if !(1..=MAX_EXPIRES_IN_DAYS).contains(&expires_in_days) {
            return Err(AppError::validation(format!(
                "expires_in_days must be between 1 and {MAX_EXPIRES_IN_DAYS}"
            )));
        }

        let expires_at = Utc::now() + chrono::Duration::days(expires_in_days);

        for attempt in 1..=self.config.max_generation_attempts {
            let code = self.codec.normalize(&self.codec.generate());

            if self.store.find_by_code(&code).await?.is_some() {
                debug!(attempt, "generated code collided; retrying");
                continue;
            }

            let data = CreateInvite {
                code,
                created_by: created_by.to_string(),
                max_uses,
                expires_at,
            };

            match self.store.insert_unique(&data).await {
                Ok(invite) => {
                    // Best effort; the read path repopulates on a miss.
                    if let Err(e) = self
                        .cache
                        .set_json(&keys::invite_by_code(&invite.code), &invite, self.cache_ttl)
                        .await
                    {
                        debug!(code = %invite.code, error = %e, "failed to pre-populate invite cache");
                    }

                    info!(
                        code = %invite.code,
                        created_by = %invite.created_by,
                        max_uses = invite.max_uses,
                        expires_at = %invite.expires_at,
                        "invite issued"
                    );
                    return Ok(invite);
                }
                Err(e) if e.kind == ErrorKind::Conflict => {
                    debug!(attempt, "lost insert race on generated code; retrying");
                }
                Err(e) => return Err(e),
            }
        }

        // At 29^7 possible codes this only fires when the corpus is
        // enormous or generation is broken; either way operators need to
        // hear about it.
        error!(
            attempts = self.config.max_generation_attempts,
            "exhausted code generation attempts without finding a free code"
        );
        Err(AppError::code_space_exhausted(format!(
            "Failed to generate a unique invite code in {} attempts",
            self.config.max_generation_attempts
        )))
    }
}
