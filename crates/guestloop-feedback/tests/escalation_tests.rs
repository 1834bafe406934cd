//! Escalation manager and manager action tests.

mod common;

use chrono::Utc;

use common::*;
use guestloop_core::{FeedbackId, ManagerId, TenantId};
use guestloop_feedback::{
    EscalationOutcome, EscalationTier, FeedbackError, FeedbackStatus, TenantHierarchy,
};

#[tokio::test]
async fn test_manual_escalation_walks_the_hierarchy() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let item = ctx.seed_feedback(2, 1.0, Utc::now()).await;
    let escalation = &ctx.services.escalation;

    let first = escalation
        .escalate(ctx.tenant_id, item.id, 1, "guest called front desk", None)
        .await
        .unwrap();
    let report = first.report().unwrap();
    assert_eq!(report.tier, EscalationTier::Primary);
    assert_eq!(report.target.email, PRIMARY_EMAIL);
    assert!(report.persisted && report.audit_recorded && report.notified);

    let second = escalation
        .escalate(ctx.tenant_id, item.id, 2, "no response", None)
        .await
        .unwrap();
    assert_eq!(second.report().unwrap().tier, EscalationTier::Backup);

    let third = escalation
        .escalate(ctx.tenant_id, item.id, 3, "still no response", None)
        .await
        .unwrap();
    assert_eq!(third.report().unwrap().target.email, GM_EMAIL);

    let history = escalation.history(ctx.tenant_id, item.id).await.unwrap();
    let levels: Vec<i32> = history.iter().map(|r| r.escalation_level).collect();
    assert_eq!(levels, vec![1, 2, 3]);
    assert_eq!(ctx.mailer.count().await, 3);
}

#[tokio::test]
async fn test_level_at_or_below_current_is_a_no_op() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let item = ctx.seed_feedback(2, 1.0, Utc::now()).await;
    let escalation = &ctx.services.escalation;

    escalation
        .escalate(ctx.tenant_id, item.id, 2, "manual", None)
        .await
        .unwrap();

    for level in [1, 2] {
        let outcome = escalation
            .escalate(ctx.tenant_id, item.id, level, "manual", None)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            EscalationOutcome::AlreadyAtLevel {
                current_level: 2,
                ..
            }
        ));
    }
    assert_eq!(ctx.mailer.count().await, 1);
    assert_eq!(ctx.feedback.snapshot(item.id).await.unwrap().escalation_level, 2);
}

#[tokio::test]
async fn test_max_escalation_sends_nothing() {
    let ctx = TestContext::new();
    let item = ctx
        .seed_with(1, 9.0, Utc::now(), |f| {
            f.escalation_level = 3;
            f.status = FeedbackStatus::Escalated;
        })
        .await;

    let outcome = ctx
        .services
        .escalation
        .escalate(ctx.tenant_id, item.id, 3, "manual", None)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        EscalationOutcome::MaxEscalationReached { current_level: 3 }
    ));
    assert_eq!(outcome.as_str(), "max_escalation_reached");
    assert_eq!(ctx.mailer.count().await, 0);
    assert!(ctx.escalation_logs.all().await.is_empty());
}

#[tokio::test]
async fn test_missing_backup_routes_level_two_to_general_manager() {
    let ctx = TestContext::new();
    ctx.hierarchy
        .set_category(
            ctx.tenant_id,
            "housekeeping",
            TenantHierarchy {
                escalation_hours: Some(2.0),
                primary: Some(contact("Head of Housekeeping", PRIMARY_EMAIL)),
                backup: None,
                general_manager: Some(contact("General Manager", GM_EMAIL)),
            },
        )
        .await;
    let item = ctx.seed_feedback(2, 1.0, Utc::now()).await;

    let outcome = ctx
        .services
        .escalation
        .escalate(ctx.tenant_id, item.id, 2, "manual", None)
        .await
        .unwrap();

    let report = outcome.report().unwrap();
    assert_eq!(report.tier, EscalationTier::GeneralManager);
    assert_eq!(report.target.email, GM_EMAIL);
    assert_eq!(report.level, 2);
}

#[tokio::test]
async fn test_unknown_feedback_is_not_found() {
    let ctx = TestContext::new();
    let item = ctx.seed_feedback(2, 1.0, Utc::now()).await;

    let missing = ctx
        .services
        .escalation
        .escalate(ctx.tenant_id, FeedbackId::new(), 1, "manual", None)
        .await;
    assert!(matches!(missing, Err(FeedbackError::FeedbackNotFound(_))));

    let other_tenant = ctx
        .services
        .escalation
        .escalate(TenantId::new(), item.id, 1, "manual", None)
        .await;
    assert!(other_tenant.unwrap_err().is_not_found());
    assert_eq!(ctx.mailer.count().await, 0);
}

#[tokio::test]
async fn test_level_below_one_is_rejected() {
    let ctx = TestContext::new();
    let item = ctx.seed_feedback(2, 1.0, Utc::now()).await;

    let result = ctx
        .services
        .escalation
        .escalate(ctx.tenant_id, item.id, 0, "manual", None)
        .await;

    assert!(matches!(result, Err(FeedbackError::Validation(_))));
}

#[tokio::test]
async fn test_resolved_feedback_is_not_escalated() {
    let ctx = TestContext::new();
    let item = ctx.seed_feedback(2, 6.0, Utc::now()).await;
    ctx.services
        .lifecycle
        .resolve(ctx.tenant_id, item.id)
        .await
        .unwrap();

    let outcome = ctx
        .services
        .escalation
        .escalate(ctx.tenant_id, item.id, 2, "manual", None)
        .await
        .unwrap();

    assert!(matches!(outcome, EscalationOutcome::Resolved));
    assert_eq!(ctx.mailer.count().await, 0);
}

#[tokio::test]
async fn test_log_write_failure_is_reported_not_raised() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    ctx.escalation_logs.set_fail_writes(true);
    let item = ctx.seed_feedback(2, 1.0, Utc::now()).await;

    let outcome = ctx
        .services
        .escalation
        .escalate(ctx.tenant_id, item.id, 1, "manual", None)
        .await
        .unwrap();

    let report = outcome.report().unwrap();
    assert!(report.persisted);
    assert!(!report.audit_recorded);
    assert!(report.escalation_record_id.is_none());
    assert!(report.notified);
    assert_eq!(ctx.feedback.snapshot(item.id).await.unwrap().escalation_level, 1);
}

#[tokio::test]
async fn test_email_failure_is_reported_not_raised() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    ctx.mailer.fail_for(BACKUP_EMAIL).await;
    let item = ctx.seed_feedback(2, 1.0, Utc::now()).await;

    let outcome = ctx
        .services
        .escalation
        .escalate(ctx.tenant_id, item.id, 2, "manual", None)
        .await
        .unwrap();

    let report = outcome.report().unwrap();
    assert!(!report.notified);
    assert!(report.notify_error.as_deref().unwrap().contains(BACKUP_EMAIL));
    assert_eq!(ctx.feedback.snapshot(item.id).await.unwrap().status, FeedbackStatus::Escalated);
}

#[tokio::test]
async fn test_from_manager_is_recorded() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let item = ctx.seed_feedback(2, 1.0, Utc::now()).await;
    let from = ManagerId::new();

    ctx.services
        .escalation
        .escalate(ctx.tenant_id, item.id, 2, "handing over", Some(from))
        .await
        .unwrap();

    let logs = ctx.escalation_logs.all().await;
    assert_eq!(logs[0].from_manager_id, Some(from));
    assert_eq!(logs[0].reason, "handing over");
}

#[tokio::test]
async fn test_acknowledge_sets_timestamp_once() {
    let ctx = TestContext::new();
    let item = ctx.seed_feedback(3, 1.0, Utc::now()).await;
    let lifecycle = &ctx.services.lifecycle;

    let first = lifecycle.acknowledge(ctx.tenant_id, item.id).await.unwrap();
    let second = lifecycle.acknowledge(ctx.tenant_id, item.id).await.unwrap();

    assert_eq!(first.status, FeedbackStatus::Acknowledged);
    assert!(first.acknowledged_at.is_some());
    assert_eq!(first.acknowledged_at, second.acknowledged_at);
}

#[tokio::test]
async fn test_manager_actions_on_unknown_feedback() {
    let ctx = TestContext::new();
    let lifecycle = &ctx.services.lifecycle;

    assert!(lifecycle
        .acknowledge(ctx.tenant_id, FeedbackId::new())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(lifecycle
        .resolve(ctx.tenant_id, FeedbackId::new())
        .await
        .unwrap_err()
        .is_not_found());
}
