//! Per-creator invite statistics.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::model::InviteCode;

/// Read-only aggregation over one creator's invite codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteStats {
    /// Total codes issued by the creator.
    pub total: u64,
    /// Codes whose active flag is set and which have not expired.
    pub active: u64,
    /// Codes past their expiry timestamp, regardless of the active flag.
    pub expired: u64,
    /// Codes with every use consumed.
    pub fully_used: u64,
    /// Mean per-code usage ratio, as a percentage.
    pub mean_usage_percent: f64,
}

impl InviteStats {
    /// Aggregate statistics over a creator's codes at the current instant.
    pub fn from_codes(codes: &[InviteCode]) -> Self {
        let now = Utc::now();
        let total = codes.len() as u64;

        let active = codes
            .iter()
            .filter(|c| c.is_active && !c.is_expired_at(now))
            .count() as u64;
        let expired = codes.iter().filter(|c| c.is_expired_at(now)).count() as u64;
        let fully_used = codes.iter().filter(|c| c.is_exhausted()).count() as u64;

        let mean_usage_percent = if codes.is_empty() {
            0.0
        } else {
            codes.iter().map(|c| c.usage_ratio()).sum::<f64>() / codes.len() as f64 * 100.0
        };

        Self {
            total,
            active,
            expired,
            fully_used,
            mean_usage_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn invite(current_uses: i32, max_uses: i32, expired: bool) -> InviteCode {
        let now = Utc::now();
        InviteCode {
            id: Uuid::new_v4(),
            code: "KKK5KKKK".to_string(),
            created_by: "admin@test.com".to_string(),
            max_uses,
            current_uses,
            is_active: current_uses < max_uses,
            expires_at: if expired {
                now - Duration::days(1)
            } else {
                now + Duration::days(7)
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_creator() {
        let stats = InviteStats::from_codes(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.mean_usage_percent, 0.0);
    }

    #[test]
    fn test_aggregation() {
        let codes = vec![
            invite(0, 2, false),  // active, 0%
            invite(2, 2, false),  // fully used, 100%
            invite(1, 2, true),   // expired with uses left, 50%
        ];
        let stats = InviteStats::from_codes(&codes);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.fully_used, 1);
        assert!((stats.mean_usage_percent - 50.0).abs() < 1e-9);
    }
}
