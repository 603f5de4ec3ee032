//! Issuance and stats behavior over in-memory backends.

mod support;

use chrono::Utc;

use invitegate_core::error::ErrorKind;
use support::Harness;

#[tokio::test]
async fn test_issued_code_passes_validation() {
    let h = Harness::new();
    let invite = h.issuance.issue("admin@test.com", 10, 30).await.unwrap();

    assert!(h.codec.validate(&invite.code));
    assert_eq!(invite.current_uses, 0);
    assert!(invite.is_active);
    assert!(invite.expires_at > Utc::now() + chrono::Duration::days(29));
}

#[tokio::test]
async fn test_issued_codes_are_distinct() {
    let h = Harness::new();
    let mut codes = std::collections::HashSet::new();
    for _ in 0..50 {
        let invite = h.issuance.issue("admin@test.com", 1, 7).await.unwrap();
        assert!(codes.insert(invite.code));
    }
}

#[tokio::test]
async fn test_issue_input_validation() {
    let h = Harness::new();

    for (created_by, max_uses, days) in [("", 5, 7), ("admin@test.com", 0, 7),
        ("admin@test.com", -1, 7), ("admin@test.com", 101, 7), ("admin@test.com", 5, 0)]
    {
        let err = h
            .issuance
            .issue(created_by, max_uses, days)
            .await
            .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::Validation,
            "input: ({created_by:?}, {max_uses}, {days})"
        );
    }
}

#[tokio::test]
async fn test_issue_rejects_oversized_validity_window() {
    let h = Harness::new();

    // Must come back as a validation error, not blow up in the expiry
    // arithmetic.
    for days in [3651, i64::MAX] {
        let err = h
            .issuance
            .issue("admin@test.com", 5, days)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "days: {days}");
    }

    let invite = h.issuance.issue("admin@test.com", 5, 3650).await.unwrap();
    assert!(invite.expires_at > Utc::now() + chrono::Duration::days(3649));
}

#[tokio::test]
async fn test_issue_accepts_the_max_uses_limit_itself() {
    let h = Harness::new();
    let invite = h.issuance.issue("admin@test.com", 100, 7).await.unwrap();
    assert_eq!(invite.max_uses, 100);
}

#[tokio::test]
async fn test_generation_exhaustion_is_a_distinct_error() {
    // Every insert collides, so the bounded loop must give up with the
    // terminal error rather than a generic conflict.
    let issuance = support::saturated_issuance(3);
    let err = issuance.issue("admin@test.com", 5, 7).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CodeSpaceExhausted);
}

#[tokio::test]
async fn test_stats_aggregate_per_creator() {
    let h = Harness::new();

    let a = h.issuance.issue("admin@test.com", 2, 7).await.unwrap();
    let _b = h.issuance.issue("admin@test.com", 4, 7).await.unwrap();
    h.issuance.issue("other@test.com", 3, 7).await.unwrap();
    h.seed_invite(
        "admin@test.com",
        5,
        0,
        Utc::now() - chrono::Duration::hours(1),
    );

    // Fully consume `a`.
    h.redemption
        .redeem(&a.code, "u1@test.com", "10.0.0.1")
        .await
        .unwrap();
    h.redemption
        .redeem(&a.code, "u2@test.com", "10.0.0.1")
        .await
        .unwrap();

    let stats = h.stats.for_creator("admin@test.com").await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.fully_used, 1);
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.active, 1);
    // Usage: 2/2, 0/4, 0/5 -> mean third of 100%.
    let expected = 100.0 / 3.0;
    assert!((stats.mean_usage_percent - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_stats_for_unknown_creator_are_zeroed() {
    let h = Harness::new();
    let stats = h.stats.for_creator("nobody@test.com").await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.mean_usage_percent, 0.0);
}

#[tokio::test]
async fn test_stats_require_a_creator() {
    let h = Harness::new();
    let err = h.stats.for_creator("  ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
