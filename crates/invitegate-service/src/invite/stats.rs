//! Per-creator invite statistics.

use std::sync::Arc;

use invitegate_core::error::AppError;
use invitegate_core::result::AppResult;
use invitegate_database::store::InviteStore;
use invitegate_entity::invite::stats::InviteStats;

/// Service that aggregates invite usage per creator.
///
/// Reads go straight to the durable store: stats are an administrative
/// view and must reflect committed state, not a cached snapshot.
#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn InviteStore>,
}

impl StatsService {
    /// Create a new stats service.
    pub fn new(store: Arc<dyn InviteStore>) -> Self {
        Self { store }
    }

    /// Aggregate statistics over every code issued by `creator`.
    pub async fn for_creator(&self, creator: &str) -> AppResult<InviteStats> {
        let creator = creator.trim();
        if creator.is_empty() {
            return Err(AppError::validation("Creator identity is required"));
        }

        let codes = self.store.query_by_creator(creator).await?;
        Ok(InviteStats::from_codes(&codes))
    }
}
