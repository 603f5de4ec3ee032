//! Durable store trait for invite records.

use async_trait::async_trait;
use uuid::Uuid;

use invitegate_core::result::AppResult;
use invitegate_entity::invite::model::{CreateInvite, InviteCode};
use invitegate_entity::invite::redemption::Redemption;

/// The durable store contract the service layer depends on.
///
/// The database is the single source of truth. Implementations must back
/// `conditional_redeem` with a genuine atomic conditional operation —
/// never a read-then-write pair across the network — and must enforce
/// identity uniqueness across the whole corpus at the storage level, not
/// only in application code.
#[async_trait]
pub trait InviteStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find an invite by its normalized code.
    ///
    /// Returns exhausted and expired records too: the redemption engine's
    /// rule checks turn those states into their specific error kinds
    /// rather than a generic not-found.
    async fn find_by_code(&self, code: &str) -> AppResult<Option<InviteCode>>;

    /// Find the invite an identity has already redeemed, if any.
    /// Indexed lookup across all redemptions.
    async fn find_by_redeemer(&self, identity: &str) -> AppResult<Option<InviteCode>>;

    /// Insert a newly issued invite. A duplicate code yields a
    /// `Conflict` error so issuance can retry with a fresh code.
    async fn insert_unique(&self, data: &CreateInvite) -> AppResult<InviteCode>;

    /// Consume one use of `invite` for `identity` in a single atomic
    /// conditional update: append the redemption row, increment
    /// `current_uses`, and recompute `is_active`, all guarded by
    /// `current_uses` still matching the loaded value.
    ///
    /// Fails with `IdentityAlreadyRedeemed` when the global identity
    /// constraint rejects the row, and `Conflict` when the guard misses
    /// (a lost-update attempt).
    async fn conditional_redeem(
        &self,
        invite: &InviteCode,
        identity: &str,
        origin: &str,
    ) -> AppResult<InviteCode>;

    /// All invites issued by a creator, newest first.
    async fn query_by_creator(&self, creator: &str) -> AppResult<Vec<InviteCode>>;

    /// All redemptions of an invite, oldest first.
    async fn redemptions_for(&self, invite_id: Uuid) -> AppResult<Vec<Redemption>>;
}
