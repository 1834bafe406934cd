//! SLA monitor integration tests.
//!
//! Drive `check_compliance_at` with a fixed clock against in-memory stores.

mod common;

use chrono::Utc;

use common::*;
use guestloop_feedback::{
    AuditAction, FeedbackStatus, SlaAction, SlaActionResult, REASON_SLA_BREACH,
};

#[tokio::test]
async fn test_five_hours_unacknowledged_escalates_to_level_two() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let now = Utc::now();
    let item = ctx.seed_feedback(2, 5.0, now).await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.escalated, 1);
    assert_eq!(report.reminders_sent, 0);
    assert_eq!(report.actions[0].action, SlaAction::Escalation { level: 2 });

    let stored = ctx.feedback.snapshot(item.id).await.unwrap();
    assert_eq!(stored.escalation_level, 2);
    assert_eq!(stored.status, FeedbackStatus::Escalated);

    let mails = ctx.mailer.sent_to(BACKUP_EMAIL).await;
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].cc, vec![MONITORING_EMAIL.to_string()]);

    let logs = ctx.escalation_logs.all().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].reason, REASON_SLA_BREACH);
    assert_eq!(logs[0].to_manager_email, BACKUP_EMAIL);
}

#[tokio::test]
async fn test_fresh_feedback_needs_no_action() {
    let ctx = TestContext::new();
    let now = Utc::now();
    ctx.seed_feedback(1, 0.2, now).await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.checked, 1);
    assert!(report.actions.is_empty());
    assert_eq!(ctx.mailer.count().await, 0);
}

#[tokio::test]
async fn test_unacknowledged_inside_window_gets_reminder() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let now = Utc::now();
    let item = ctx.seed_feedback(3, 1.0, now).await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.reminders_sent, 1);
    assert_eq!(report.actions[0].action, SlaAction::Reminder { level: 1 });
    let mails = ctx.mailer.sent_to(PRIMARY_EMAIL).await;
    assert_eq!(mails.len(), 1);
    assert!(mails[0].cc.contains(&MONITORING_EMAIL.to_string()));

    let stored = ctx.feedback.snapshot(item.id).await.unwrap();
    assert_eq!(stored.status, FeedbackStatus::Pending);
    assert_eq!(stored.escalation_level, 0);
}

#[tokio::test]
async fn test_acknowledged_inside_window_is_left_alone() {
    let ctx = TestContext::new();
    let now = Utc::now();
    ctx.seed_with(3, 2.0, now, |f| {
        f.acknowledged_at = Some(f.created_at);
        f.status = FeedbackStatus::Acknowledged;
    })
    .await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert!(report.actions.is_empty());
    assert_eq!(ctx.mailer.count().await, 0);
}

#[tokio::test]
async fn test_missing_category_uses_default_hierarchy() {
    let ctx = TestContext::new();
    let now = Utc::now();
    ctx.seed_with(3, 1.0, now, |f| f.issue_category = Some("spa".to_string()))
        .await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.reminders_sent, 1);
    assert_eq!(ctx.mailer.sent_to(DEFAULT_PRIMARY_EMAIL).await.len(), 1);
}

#[tokio::test]
async fn test_general_manager_level_is_terminal() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let now = Utc::now();
    let item = ctx
        .seed_with(1, 20.0, now, |f| {
            f.escalation_level = 3;
            f.status = FeedbackStatus::Escalated;
        })
        .await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.max_escalation_reached, 1);
    assert_eq!(report.escalated, 0);
    assert_eq!(
        report.actions[0].result,
        SlaActionResult::MaxEscalationReached
    );
    assert_eq!(ctx.mailer.count().await, 0);
    assert_eq!(ctx.feedback.snapshot(item.id).await.unwrap().escalation_level, 3);
}

#[tokio::test]
async fn test_long_overdue_jumps_straight_to_general_manager() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let now = Utc::now();
    let item = ctx.seed_feedback(2, 13.0, now).await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.actions[0].action, SlaAction::Escalation { level: 4 });
    assert_eq!(ctx.feedback.snapshot(item.id).await.unwrap().escalation_level, 3);
    assert_eq!(ctx.mailer.sent_to(GM_EMAIL).await.len(), 1);
}

#[tokio::test]
async fn test_repeat_pass_does_not_resend_escalation() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let now = Utc::now();
    ctx.seed_feedback(2, 5.0, now).await;

    ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();
    let second = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(second.escalated, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(second.actions[0].result, SlaActionResult::AlreadyAtLevel);
    assert_eq!(ctx.mailer.count().await, 1);
    assert_eq!(ctx.escalation_logs.all().await.len(), 1);
}

#[tokio::test]
async fn test_resolved_items_are_skipped_by_later_runs() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    let now = Utc::now();
    let item = ctx.seed_feedback(2, 5.0, now).await;

    ctx.services
        .lifecycle
        .resolve(ctx.tenant_id, item.id)
        .await
        .unwrap();
    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.checked, 0);
    assert_eq!(ctx.mailer.count().await, 0);
    assert_eq!(ctx.feedback.snapshot(item.id).await.unwrap().escalation_level, 0);
}

#[tokio::test]
async fn test_item_failure_does_not_stop_the_pass() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    ctx.mailer.fail_for(PRIMARY_EMAIL).await;
    let now = Utc::now();
    ctx.seed_feedback(3, 1.0, now).await;
    ctx.seed_feedback(2, 5.0, now).await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.checked, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.escalated, 1);
    assert_eq!(ctx.mailer.sent_to(BACKUP_EMAIL).await.len(), 1);
}

#[tokio::test]
async fn test_escalation_email_failure_still_persists_level() {
    let ctx = TestContext::new();
    ctx.configure_housekeeping(4.0).await;
    ctx.mailer.set_failing(true);
    let now = Utc::now();
    let item = ctx.seed_feedback(2, 5.0, now).await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.escalated, 1);
    assert_eq!(report.notify_failures, 1);
    assert_eq!(
        report.actions[0].result,
        SlaActionResult::Escalated {
            notified: false,
            audit_recorded: true
        }
    );
    assert_eq!(ctx.feedback.snapshot(item.id).await.unwrap().escalation_level, 2);
}

#[tokio::test]
async fn test_hierarchy_lookup_failure_is_counted() {
    let ctx = TestContext::new();
    ctx.hierarchy.set_fail_lookups(true);
    let now = Utc::now();
    ctx.seed_feedback(2, 5.0, now).await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(ctx.mailer.count().await, 0);
}

#[tokio::test]
async fn test_scan_failure_aborts_the_run() {
    let ctx = TestContext::new();
    ctx.feedback.set_fail_scans(true);

    let result = ctx.services.sla_monitor.check_compliance_at(Utc::now()).await;

    assert!(result.is_err());
    assert_eq!(ctx.audit.count().await, 0);
}

#[tokio::test]
async fn test_run_writes_audit_summary() {
    let ctx = TestContext::new();
    let now = Utc::now();
    ctx.seed_feedback(3, 1.0, now).await;

    ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    let entries = ctx.audit.entries_for(AuditAction::SlaComplianceCheck).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].details["checked"], 1);
    assert_eq!(entries[0].details["reminders_sent"], 1);
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_the_run() {
    let ctx = TestContext::new();
    ctx.audit.set_fail_writes(true);
    let now = Utc::now();
    ctx.seed_feedback(3, 1.0, now).await;

    let report = ctx.services.sla_monitor.check_compliance_at(now).await.unwrap();

    assert_eq!(report.reminders_sent, 1);
}
