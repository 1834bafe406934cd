//! Router tests for feedback endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{body_json, TestApp};
use guestloop_feedback::{FeedbackConfig, ResponseDraft};

#[tokio::test]
async fn test_sla_trigger_returns_run_report() {
    let app = TestApp::new();
    let item = app.seed(2, 5, "Room was not cleaned").await;

    let response = app.post("/internal/jobs/sla-monitor", json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["checked"], 1);
    assert_eq!(body["escalated"], 1);
    assert_eq!(body["actions"][0]["action"], "escalation");
    assert_eq!(body["actions"][0]["level"], 2);
    assert_eq!(
        app.feedback.snapshot(item.id).await.unwrap().escalation_level,
        2
    );
}

#[tokio::test]
async fn test_sla_trigger_scan_failure_is_server_error() {
    let app = TestApp::new();
    app.feedback.set_fail_scans(true);

    let response = app.post("/internal/jobs/sla-monitor", json!({})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn test_manual_escalation() {
    let app = TestApp::new();
    let item = app.seed(3, 1, "Noisy neighbours").await;

    let response = app
        .post(
            &format!("/feedback/{}/escalate", item.id),
            json!({"level": 3, "reason": "VIP guest"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["outcome"], "escalated");
    assert_eq!(body["tier"], "general_manager");
    assert_eq!(body["target_email"], "gm@guestloop.app");
    assert_eq!(body["notified"], true);

    let again = app
        .post(&format!("/feedback/{}/escalate", item.id), json!({"level": 2}))
        .await;
    assert_eq!(body_json(again).await["outcome"], "max_escalation_reached");
}

#[tokio::test]
async fn test_escalation_rejects_invalid_level() {
    let app = TestApp::new();
    let item = app.seed(3, 1, "Noisy").await;

    let response = app
        .post(&format!("/feedback/{}/escalate", item.id), json!({"level": 0}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");
}

#[tokio::test]
async fn test_missing_tenant_header_is_rejected() {
    let app = TestApp::new();
    let item = app.seed(3, 1, "Noisy").await;

    let response = app
        .send(
            "POST",
            &format!("/feedback/{}/acknowledge", item.id),
            None,
            false,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "tenant_required");
}

#[tokio::test]
async fn test_acknowledge_and_resolve() {
    let app = TestApp::new();
    let item = app.seed(4, 1, "Towels missing").await;

    let ack = app
        .post(&format!("/feedback/{}/acknowledge", item.id), json!({}))
        .await;
    assert_eq!(ack.status(), StatusCode::OK);
    assert_eq!(body_json(ack).await["status"], "acknowledged");

    let resolved = app
        .post(&format!("/feedback/{}/resolve", item.id), json!({}))
        .await;
    let body = body_json(resolved).await;
    assert_eq!(body["status"], "resolved");
    assert!(body["resolved_at"].is_string());
}

#[tokio::test]
async fn test_unknown_feedback_is_not_found() {
    let app = TestApp::new();

    let response = app
        .post(&format!("/feedback/{}/resolve", Uuid::new_v4()), json!({}))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_screen_flags_risky_feedback_and_holds_send() {
    let app = TestApp::new();
    let item = app
        .seed(5, 1, "I got food poisoning and the staff assaulted me")
        .await;

    let response = app
        .post(
            "/responses/screen",
            json!({
                "feedback_id": item.id,
                "response_text": "<p>We are so sorry.</p>"
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["state"], "pending");
    assert_eq!(body["high_risk"], true);
    assert_eq!(body["severity"], "HIGH");
    assert_eq!(body["send_delay_secs"], 180);

    let approval_id = body["approval_id"].as_str().unwrap().to_string();
    let fetched = app.get(&format!("/approvals/{approval_id}")).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let approval = body_json(fetched).await;
    assert_eq!(approval["status"], "pending");
    assert_eq!(approval["recipient_email"], "guest@example.com");

    assert!(app.mailer.sent_to("guest@example.com").await.is_empty());
}

#[tokio::test]
async fn test_screen_low_risk_is_not_required() {
    let app = TestApp::new();
    let item = app.seed(5, 1, "Wonderful stay").await;

    let response = app
        .post(
            "/responses/screen",
            json!({"feedback_id": item.id, "response_text": "<p>Thanks!</p>", "subject": "Thanks"}),
        )
        .await;

    let body = body_json(response).await;
    assert_eq!(body["state"], "not_required");
    assert!(body["approval_id"].is_null());
}

#[tokio::test]
async fn test_screen_fails_closed_when_approval_cannot_be_created() {
    let app = TestApp::new();
    app.approvals.set_fail_writes(true);
    let item = app.seed(1, 1, "Bed bugs!").await;

    let response = app
        .post(
            "/responses/screen",
            json!({"feedback_id": item.id, "response_text": "<p>Sorry</p>"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"], "risk_gate_failure");
}

#[tokio::test]
async fn test_approval_decision_and_conflict() {
    let app = TestApp::new();
    let item = app.seed(2, 1, "Lawsuit incoming").await;
    let screened = body_json(
        app.post(
            "/responses/screen",
            json!({"feedback_id": item.id, "response_text": "<p>Sorry</p>"}),
        )
        .await,
    )
    .await;
    let approval_id = screened["approval_id"].as_str().unwrap().to_string();
    let reviewer = Uuid::new_v4();

    let decided = app
        .post(
            &format!("/approvals/{approval_id}/decision"),
            json!({"approved": false, "decided_by": reviewer, "reason": "legal review"}),
        )
        .await;
    assert_eq!(decided.status(), StatusCode::OK);
    let body = body_json(decided).await;
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["decision_reason"], "legal review");

    let again = app
        .post(
            &format!("/approvals/{approval_id}/decision"),
            json!({"approved": true, "decided_by": reviewer}),
        )
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_approval_after_cooldown_sends_reply() {
    let mut config = FeedbackConfig::default();
    config.gate.send_delay_secs = 0;
    let app = TestApp::with_config(config);
    let item = app.seed(4, 1, "Smoke from a small fire in the kitchen").await;
    let draft = ResponseDraft {
        feedback_id: Some(item.id),
        feedback_text: item.comment.clone().unwrap_or_default(),
        rating: item.rating,
        recipient_email: "guest@example.com".to_string(),
        subject: "About your stay".to_string(),
        response_html: "<p>We are so sorry</p>".to_string(),
    };
    let decision = app.services.gate.screen(app.tenant_id, &draft).await.unwrap();
    let approval_id = decision.approval_id().unwrap();

    let response = app
        .post(
            &format!("/approvals/{approval_id}/decision"),
            json!({"approved": true, "decided_by": Uuid::new_v4()}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["send_outcome"], "sent");
    assert!(body["sent_at"].is_string());
    assert_eq!(app.mailer.sent_to("guest@example.com").await.len(), 1);
}

#[tokio::test]
async fn test_approval_expiry_trigger() {
    let app = TestApp::new();

    let response = app.post("/internal/jobs/approval-expiry", json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["expired"], 0);
}

#[tokio::test]
async fn test_email_queue_trigger_on_empty_queue() {
    let app = TestApp::new();

    let response = app.post("/internal/jobs/email-queue", json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["processed"], 0);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let response = app.send("GET", "/api-docs/openapi.json", None, false).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/responses/screen"].is_object());
}
