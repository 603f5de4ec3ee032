//! Invite repository implementation over sqlx/PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use invitegate_core::error::{AppError, ErrorKind};
use invitegate_core::result::AppResult;
use invitegate_entity::invite::model::{CreateInvite, InviteCode};
use invitegate_entity::invite::redemption::Redemption;

use crate::store::InviteStore;

/// Repository for invite code persistence and the atomic redemption update.
#[derive(Debug, Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    /// Create a new invite repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_err(context: &str, e: sqlx::Error) -> AppError {
        AppError::with_source(ErrorKind::Database, context.to_string(), e)
    }

    fn is_unique_violation(e: &sqlx::Error) -> bool {
        matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
    }
}

#[async_trait]
impl InviteStore for InviteRepository {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<InviteCode>> {
        sqlx::query_as::<_, InviteCode>("SELECT * FROM invite_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_err("Failed to find invite by code", e))
    }

    async fn find_by_redeemer(&self, identity: &str) -> AppResult<Option<InviteCode>> {
        sqlx::query_as::<_, InviteCode>(
            "SELECT ic.* FROM invite_codes ic \
             JOIN redemptions r ON r.invite_id = ic.id \
             WHERE r.identity = $1",
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_err("Failed to find invite by redeemer", e))
    }

    async fn insert_unique(&self, data: &CreateInvite) -> AppResult<InviteCode> {
        sqlx::query_as::<_, InviteCode>(
            "INSERT INTO invite_codes (code, created_by, max_uses, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.code)
        .bind(&data.created_by)
        .bind(data.max_uses)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if Self::is_unique_violation(&e) {
                AppError::conflict(format!("Invite code '{}' already exists", data.code))
            } else {
                Self::map_err("Failed to insert invite", e)
            }
        })
    }

    async fn conditional_redeem(
        &self,
        invite: &InviteCode,
        identity: &str,
        origin: &str,
    ) -> AppResult<InviteCode> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::map_err("Failed to begin redemption transaction", e))?;

        // The UNIQUE constraint on redemptions.identity is the global
        // cross-code backstop; the engine's pre-check is only an
        // optimization.
        sqlx::query("INSERT INTO redemptions (invite_id, identity, origin) VALUES ($1, $2, $3)")
            .bind(invite.id)
            .bind(identity)
            .bind(origin)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if Self::is_unique_violation(&e) {
                    AppError::identity_already_redeemed(format!(
                        "Identity '{identity}' has already redeemed an invite"
                    ))
                } else {
                    Self::map_err("Failed to insert redemption", e)
                }
            })?;

        // Guarded by the loaded current_uses so two redeemers can never
        // both observe k and both write k+1.
        let updated = sqlx::query_as::<_, InviteCode>(
            "UPDATE invite_codes \
             SET current_uses = current_uses + 1, \
                 is_active = (current_uses + 1 < max_uses), \
                 updated_at = NOW() \
             WHERE id = $1 AND current_uses = $2 \
             RETURNING *",
        )
        .bind(invite.id)
        .bind(invite.current_uses)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Self::map_err("Failed to update invite uses", e))?;

        match updated {
            Some(row) => {
                tx.commit()
                    .await
                    .map_err(|e| Self::map_err("Failed to commit redemption", e))?;
                Ok(row)
            }
            // Dropping the transaction rolls back the redemption row.
            None => Err(AppError::conflict(format!(
                "Invite '{}' changed since it was loaded",
                invite.code
            ))),
        }
    }

    async fn query_by_creator(&self, creator: &str) -> AppResult<Vec<InviteCode>> {
        sqlx::query_as::<_, InviteCode>(
            "SELECT * FROM invite_codes WHERE created_by = $1 ORDER BY created_at DESC",
        )
        .bind(creator)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::map_err("Failed to list invites by creator", e))
    }

    async fn redemptions_for(&self, invite_id: Uuid) -> AppResult<Vec<Redemption>> {
        sqlx::query_as::<_, Redemption>(
            "SELECT * FROM redemptions WHERE invite_id = $1 ORDER BY redeemed_at ASC",
        )
        .bind(invite_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::map_err("Failed to list redemptions", e))
    }
}
