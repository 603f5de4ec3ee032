//! Shared test fixtures: an in-memory [`InviteStore`] and a fully wired
//! service stack over the memory cache and lease backends.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use invitegate_cache::lock::LockManager;
use invitegate_cache::memory::{MemoryCacheProvider, MemoryLockStore};
use invitegate_cache::provider::CacheManager;
use invitegate_codec::InviteCodec;
use invitegate_core::config::cache::MemoryCacheConfig;
use invitegate_core::config::invite::InviteConfig;
use invitegate_core::error::AppError;
use invitegate_core::result::AppResult;
use invitegate_database::store::InviteStore;
use invitegate_entity::invite::model::{CreateInvite, InviteCode};
use invitegate_entity::invite::redemption::Redemption;
use invitegate_service::{IssuanceService, RedemptionService, StatsService};

pub const TEST_ALPHABET: &str = "K7Q2N5XR8BMVY9CW3PFGJH6DZT4SL";
pub const TEST_SALT: &str = "TestSalt2024";

/// In-memory [`InviteStore`] with the same atomicity guarantees as the
/// PostgreSQL implementation: the guarded increment and the redemption
/// insert happen under one mutex, and identity uniqueness is global.
#[derive(Debug, Default)]
pub struct MemoryInviteStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    invites: HashMap<String, InviteCode>,
    redemptions: Vec<Redemption>,
}

impl MemoryInviteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an invite directly, bypassing issuance. Lets tests seed
    /// expired or partially consumed records.
    pub fn seed(&self, invite: InviteCode) {
        let mut inner = self.inner.lock().unwrap();
        inner.invites.insert(invite.code.clone(), invite);
    }

    /// Snapshot an invite by code.
    pub fn get(&self, code: &str) -> Option<InviteCode> {
        self.inner.lock().unwrap().invites.get(code).cloned()
    }
}

#[async_trait]
impl InviteStore for MemoryInviteStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<InviteCode>> {
        Ok(self.inner.lock().unwrap().invites.get(code).cloned())
    }

    async fn find_by_redeemer(&self, identity: &str) -> AppResult<Option<InviteCode>> {
        let inner = self.inner.lock().unwrap();
        let redemption = inner.redemptions.iter().find(|r| r.identity == identity);
        Ok(redemption.and_then(|r| {
            inner
                .invites
                .values()
                .find(|i| i.id == r.invite_id)
                .cloned()
        }))
    }

    async fn insert_unique(&self, data: &CreateInvite) -> AppResult<InviteCode> {
        let mut inner = self.inner.lock().unwrap();
        if inner.invites.contains_key(&data.code) {
            return Err(AppError::conflict(format!(
                "Invite code '{}' already exists",
                data.code
            )));
        }

        let now = Utc::now();
        let invite = InviteCode {
            id: Uuid::new_v4(),
            code: data.code.clone(),
            created_by: data.created_by.clone(),
            max_uses: data.max_uses,
            current_uses: 0,
            is_active: true,
            expires_at: data.expires_at,
            created_at: now,
            updated_at: now,
        };
        inner.invites.insert(invite.code.clone(), invite.clone());
        Ok(invite)
    }

    async fn conditional_redeem(
        &self,
        invite: &InviteCode,
        identity: &str,
        origin: &str,
    ) -> AppResult<InviteCode> {
        let mut inner = self.inner.lock().unwrap();

        if inner.redemptions.iter().any(|r| r.identity == identity) {
            return Err(AppError::identity_already_redeemed(format!(
                "Identity '{identity}' has already redeemed an invite"
            )));
        }

        let stored = inner
            .invites
            .get_mut(&invite.code)
            .ok_or_else(|| AppError::not_found("invite disappeared"))?;

        // The lost-update guard: the caller's snapshot must still match.
        if stored.current_uses != invite.current_uses {
            return Err(AppError::conflict(format!(
                "Invite '{}' changed since it was loaded",
                invite.code
            )));
        }

        stored.current_uses += 1;
        stored.is_active = stored.current_uses < stored.max_uses;
        stored.updated_at = Utc::now();
        let updated = stored.clone();

        inner.redemptions.push(Redemption {
            id: Uuid::new_v4(),
            invite_id: updated.id,
            identity: identity.to_string(),
            origin: origin.to_string(),
            redeemed_at: Utc::now(),
        });

        Ok(updated)
    }

    async fn query_by_creator(&self, creator: &str) -> AppResult<Vec<InviteCode>> {
        let inner = self.inner.lock().unwrap();
        let mut codes: Vec<InviteCode> = inner
            .invites
            .values()
            .filter(|i| i.created_by == creator)
            .cloned()
            .collect();
        codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(codes)
    }

    async fn redemptions_for(&self, invite_id: Uuid) -> AppResult<Vec<Redemption>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Redemption> = inner
            .redemptions
            .iter()
            .filter(|r| r.invite_id == invite_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.redeemed_at.cmp(&b.redeemed_at));
        Ok(rows)
    }
}

/// Store double whose inserts always collide, driving generation to
/// exhaustion.
#[derive(Debug, Default)]
pub struct SaturatedInviteStore;

#[async_trait]
impl InviteStore for SaturatedInviteStore {
    async fn find_by_code(&self, _code: &str) -> AppResult<Option<InviteCode>> {
        Ok(None)
    }

    async fn find_by_redeemer(&self, _identity: &str) -> AppResult<Option<InviteCode>> {
        Ok(None)
    }

    async fn insert_unique(&self, data: &CreateInvite) -> AppResult<InviteCode> {
        Err(AppError::conflict(format!(
            "Invite code '{}' already exists",
            data.code
        )))
    }

    async fn conditional_redeem(
        &self,
        invite: &InviteCode,
        _identity: &str,
        _origin: &str,
    ) -> AppResult<InviteCode> {
        Err(AppError::conflict(format!(
            "Invite '{}' changed since it was loaded",
            invite.code
        )))
    }

    async fn query_by_creator(&self, _creator: &str) -> AppResult<Vec<InviteCode>> {
        Ok(Vec::new())
    }

    async fn redemptions_for(&self, _invite_id: Uuid) -> AppResult<Vec<Redemption>> {
        Ok(Vec::new())
    }
}

/// Store double whose conditional update always misses its guard, as if
/// every snapshot were stale. Reads delegate to a real in-memory store.
#[derive(Debug, Default)]
pub struct StaleSnapshotStore {
    pub inner: MemoryInviteStore,
}

#[async_trait]
impl InviteStore for StaleSnapshotStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<InviteCode>> {
        self.inner.find_by_code(code).await
    }

    async fn find_by_redeemer(&self, identity: &str) -> AppResult<Option<InviteCode>> {
        self.inner.find_by_redeemer(identity).await
    }

    async fn insert_unique(&self, data: &CreateInvite) -> AppResult<InviteCode> {
        self.inner.insert_unique(data).await
    }

    async fn conditional_redeem(
        &self,
        invite: &InviteCode,
        _identity: &str,
        _origin: &str,
    ) -> AppResult<InviteCode> {
        Err(AppError::conflict(format!(
            "Invite '{}' changed since it was loaded",
            invite.code
        )))
    }

    async fn query_by_creator(&self, creator: &str) -> AppResult<Vec<InviteCode>> {
        self.inner.query_by_creator(creator).await
    }

    async fn redemptions_for(&self, invite_id: Uuid) -> AppResult<Vec<Redemption>> {
        self.inner.redemptions_for(invite_id).await
    }
}

fn memory_cache() -> Arc<CacheManager> {
    Arc::new(CacheManager::from_provider(Arc::new(
        MemoryCacheProvider::new(&MemoryCacheConfig::default(), 60),
    )))
}

/// An issuance service whose store reports every insert as a collision.
pub fn saturated_issuance(max_attempts: u32) -> IssuanceService {
    let codec = Arc::new(InviteCodec::new(TEST_ALPHABET, TEST_SALT).unwrap());
    let config = InviteConfig {
        max_generation_attempts: max_attempts,
        ..InviteConfig::default()
    };
    IssuanceService::new(
        Arc::new(SaturatedInviteStore),
        memory_cache(),
        codec,
        config,
        Duration::from_secs(60),
    )
}

/// A redemption service over a store whose conditional update always
/// misses, plus a seeded redeemable code.
pub fn contested_redemption() -> (RedemptionService, String) {
    let store = Arc::new(StaleSnapshotStore::default());
    let locks = Arc::new(LockManager::new(
        Arc::new(MemoryLockStore::new()),
        Duration::from_secs(5),
    ));
    let codec = Arc::new(InviteCodec::new(TEST_ALPHABET, TEST_SALT).unwrap());

    let code = codec.normalize(&codec.generate());
    let now = Utc::now();
    store.inner.seed(InviteCode {
        id: Uuid::new_v4(),
        code: code.clone(),
        created_by: "admin@test.com".to_string(),
        max_uses: 5,
        current_uses: 0,
        is_active: true,
        expires_at: now + chrono::Duration::days(7),
        created_at: now,
        updated_at: now,
    });

    let service = RedemptionService::new(
        store,
        memory_cache(),
        locks,
        codec,
        Duration::from_secs(60),
    );
    (service, code)
}

/// A fully wired service stack over in-memory backends.
pub struct Harness {
    pub store: Arc<MemoryInviteStore>,
    pub cache: Arc<CacheManager>,
    pub codec: Arc<InviteCodec>,
    pub redemption: RedemptionService,
    pub issuance: IssuanceService,
    pub stats: StatsService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_lock_ttl(Duration::from_secs(5))
    }

    pub fn with_lock_ttl(lock_ttl: Duration) -> Self {
        let store = Arc::new(MemoryInviteStore::new());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(
            MemoryCacheProvider::new(&MemoryCacheConfig::default(), 60),
        )));
        let locks = Arc::new(LockManager::new(Arc::new(MemoryLockStore::new()), lock_ttl));
        let codec = Arc::new(InviteCodec::new(TEST_ALPHABET, TEST_SALT).unwrap());
        let cache_ttl = Duration::from_secs(60);

        let invite_config = InviteConfig::default();

        let redemption = RedemptionService::new(
            store.clone(),
            cache.clone(),
            locks,
            codec.clone(),
            cache_ttl,
        );
        let issuance = IssuanceService::new(
            store.clone(),
            cache.clone(),
            codec.clone(),
            invite_config,
            cache_ttl,
        );
        let stats = StatsService::new(store.clone());

        Self {
            store,
            cache,
            codec,
            redemption,
            issuance,
            stats,
        }
    }

    /// Seed an invite with a codec-valid code and return its normalized code.
    pub fn seed_invite(
        &self,
        created_by: &str,
        max_uses: i32,
        current_uses: i32,
        expires_at: DateTime<Utc>,
    ) -> String {
        let code = self.codec.normalize(&self.codec.generate());
        let now = Utc::now();
        self.store.seed(InviteCode {
            id: Uuid::new_v4(),
            code: code.clone(),
            created_by: created_by.to_string(),
            max_uses,
            current_uses,
            is_active: current_uses < max_uses,
            expires_at,
            created_at: now,
            updated_at: now,
        });
        code
    }
}
