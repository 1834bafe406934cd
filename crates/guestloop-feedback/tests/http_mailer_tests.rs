//! HTTP mailer tests against a mock email API.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use guestloop_feedback::{EmailMessage, FeedbackError, HttpMailer, Mailer};

fn message() -> EmailMessage {
    EmailMessage::new(
        "Guestloop <notifications@guestloop.app>",
        "gm@hotel.test",
        "Escalation level 3",
        "<p>Please review.</p>",
    )
    .with_cc("monitoring@guestloop.app")
}

#[tokio::test]
async fn test_posts_json_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({
            "from": "Guestloop <notifications@guestloop.app>",
            "to": ["gm@hotel.test"],
            "cc": ["monitoring@guestloop.app"],
            "subject": "Escalation level 3",
            "html": "<p>Please review.</p>"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "msg_1"})))
        .expect(1)
        .mount(&server)
        .await;

    let mailer = HttpMailer::new(format!("{}/emails", server.uri()), "test-key").unwrap();
    mailer.send(&message()).await.unwrap();
}

#[tokio::test]
async fn test_non_success_status_is_external_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid recipient"))
        .mount(&server)
        .await;

    let mailer = HttpMailer::new(format!("{}/emails", server.uri()), "test-key").unwrap();
    let err = mailer.send(&message()).await.unwrap_err();

    match err {
        FeedbackError::ExternalService(msg) => {
            assert!(msg.contains("422"));
            assert!(msg.contains("invalid recipient"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_api_is_external_failure() {
    let mailer = HttpMailer::new("http://127.0.0.1:9/emails", "test-key").unwrap();
    let err = mailer.send(&message()).await.unwrap_err();
    assert!(matches!(err, FeedbackError::ExternalService(_)));
}
