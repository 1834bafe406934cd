//! Response risk gate and approval decision tests.

mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use common::*;
use guestloop_core::ApprovalId;
use guestloop_feedback::{
    ApprovalStatus, AuditAction, FeedbackError, GateDecision, Severity,
};

#[tokio::test]
async fn test_keyword_flags_despite_five_star_rating() {
    let ctx = TestContext::new();
    let assessment = ctx
        .services
        .gate
        .evaluate("I got food poisoning and the staff assaulted me", 5);

    assert!(assessment.high_risk);
    assert_eq!(assessment.severity, Some(Severity::High));
    assert!(assessment.risk_factors.contains(&"food poisoning".to_string()));
    assert!(assessment.risk_factors.contains(&"assault".to_string()));
}

#[tokio::test]
async fn test_low_risk_draft_needs_no_approval() {
    let ctx = TestContext::new();

    let decision = ctx
        .services
        .gate
        .screen(ctx.tenant_id, &draft("Great breakfast, friendly staff.", 5))
        .await
        .unwrap();

    assert!(matches!(decision, GateDecision::NotRequired { .. }));
    assert_eq!(decision.as_str(), "not_required");
    assert_eq!(ctx.approvals.count().await, 0);
    assert_eq!(ctx.mailer.count().await, 0);
}

#[tokio::test]
async fn test_flagged_draft_creates_pending_approval() {
    let ctx = TestContext::new();
    let now = Utc::now();

    let decision = ctx
        .services
        .gate
        .screen_at(ctx.tenant_id, &draft("There were BED BUGS in the room", 4), now)
        .await
        .unwrap();

    let GateDecision::Pending {
        approval_id,
        expires_at,
        ..
    } = decision
    else {
        panic!("expected pending decision, got {decision:?}");
    };
    assert_eq!(expires_at, now + Duration::hours(24));

    let approval = ctx.approvals.snapshot(approval_id).await.unwrap();
    assert_eq!(approval.status, ApprovalStatus::Pending);
    assert_eq!(approval.severity_level, "HIGH");
    assert_eq!(approval.risk_factors, vec!["bed bugs".to_string()]);
    assert!(approval.notification_sent);

    let review = ctx.mailer.sent_to(REVIEWER_EMAIL).await;
    assert_eq!(review.len(), 1);
    assert!(review[0].subject.starts_with("Approval needed"));
    assert_eq!(
        ctx.audit
            .entries_for(AuditAction::ResponseApprovalRequested)
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn test_low_rating_alone_is_flagged() {
    let ctx = TestContext::new();

    let decision = ctx
        .services
        .gate
        .screen(ctx.tenant_id, &draft("The room was a bit small.", 2))
        .await
        .unwrap();

    assert_eq!(
        decision.assessment().risk_factors,
        vec!["low_rating:2".to_string()]
    );
    assert!(decision.approval_id().is_some());
}

#[tokio::test]
async fn test_approval_store_failure_fails_closed() {
    let ctx = TestContext::new();
    ctx.approvals.set_fail_writes(true);

    let result = ctx
        .services
        .gate
        .screen(ctx.tenant_id, &draft("They threatened a lawsuit", 1))
        .await;

    assert!(matches!(result, Err(FeedbackError::RiskGate(_))));
    assert_eq!(ctx.mailer.count().await, 0);
}

#[tokio::test]
async fn test_reviewer_email_failure_keeps_approval() {
    let ctx = TestContext::new();
    ctx.mailer.fail_for(REVIEWER_EMAIL).await;

    let decision = ctx
        .services
        .gate
        .screen(ctx.tenant_id, &draft("A fire alarm went off all night", 3))
        .await
        .unwrap();

    let approval = ctx
        .approvals
        .snapshot(decision.approval_id().unwrap())
        .await
        .unwrap();
    assert_eq!(approval.status, ApprovalStatus::Pending);
    assert!(!approval.notification_sent);
}

#[tokio::test]
async fn test_decision_moves_pending_to_approved_once() {
    let ctx = TestContext::new();
    let decision = ctx
        .services
        .gate
        .screen(ctx.tenant_id, &draft("medical emergency at the pool", 4))
        .await
        .unwrap();
    let id = decision.approval_id().unwrap();
    let reviewer = Uuid::new_v4();

    let approved = ctx
        .services
        .approvals
        .decide(ctx.tenant_id, id, true, reviewer, Some("apology is fine".into()))
        .await
        .unwrap();
    assert!(approved.send.is_none());
    let approved = approved.approval;
    assert_eq!(approved.status, ApprovalStatus::Approved);
    assert_eq!(approved.decided_by, Some(reviewer));
    assert!(approved.decided_at.is_some());

    let again = ctx
        .services
        .approvals
        .decide(ctx.tenant_id, id, false, reviewer, None)
        .await;
    assert!(matches!(again, Err(FeedbackError::ApprovalNotPending(_))));
    assert_eq!(
        ctx.audit
            .entries_for(AuditAction::ResponseApprovalDecided)
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn test_decision_on_unknown_approval_is_not_found() {
    let ctx = TestContext::new();

    let result = ctx
        .services
        .approvals
        .decide(ctx.tenant_id, ApprovalId::new(), true, Uuid::new_v4(), None)
        .await;

    assert!(matches!(result, Err(FeedbackError::ApprovalNotFound(_))));
}

#[tokio::test]
async fn test_expire_pending_marks_stale_requests() {
    let ctx = TestContext::new();
    let now = Utc::now();
    let stale = ctx
        .services
        .gate
        .screen_at(ctx.tenant_id, &draft("discrimination at check-in", 4), now - Duration::hours(25))
        .await
        .unwrap()
        .approval_id()
        .unwrap();
    let fresh = ctx
        .services
        .gate
        .screen_at(ctx.tenant_id, &draft("discrimination at check-in", 4), now)
        .await
        .unwrap()
        .approval_id()
        .unwrap();

    let expired = ctx.services.approvals.expire_pending(now).await.unwrap();

    assert_eq!(expired, 1);
    assert_eq!(
        ctx.approvals.snapshot(stale).await.unwrap().status,
        ApprovalStatus::Expired
    );
    assert_eq!(
        ctx.approvals.snapshot(fresh).await.unwrap().status,
        ApprovalStatus::Pending
    );

    let late = ctx
        .services
        .approvals
        .decide(ctx.tenant_id, stale, true, Uuid::new_v4(), None)
        .await;
    assert!(late.unwrap_err().is_conflict());
}
