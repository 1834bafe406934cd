//! Shared fixtures for feedback router tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use guestloop_api_feedback::{feedback_router, FeedbackState, TENANT_HEADER};
use guestloop_core::TenantId;
use guestloop_feedback::{
    Feedback, FeedbackConfig, FeedbackServices, FeedbackStores, InMemoryApprovalStore,
    InMemoryAuditStore, InMemoryEmailQueueStore, InMemoryEscalationLogStore,
    InMemoryFeedbackStore, InMemoryHierarchyStore, InMemoryMailer,
};

pub struct TestApp {
    pub tenant_id: TenantId,
    pub feedback: Arc<InMemoryFeedbackStore>,
    pub approvals: Arc<InMemoryApprovalStore>,
    pub mailer: Arc<InMemoryMailer>,
    pub services: FeedbackServices,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(FeedbackConfig::default())
    }

    pub fn with_config(config: FeedbackConfig) -> Self {
        let feedback = Arc::new(InMemoryFeedbackStore::new());
        let approvals = Arc::new(InMemoryApprovalStore::new());
        let mailer = Arc::new(InMemoryMailer::new());
        let stores = FeedbackStores {
            feedback: feedback.clone(),
            hierarchy: Arc::new(InMemoryHierarchyStore::new()),
            escalation_logs: Arc::new(InMemoryEscalationLogStore::new()),
            approvals: approvals.clone(),
            email_queue: Arc::new(InMemoryEmailQueueStore::new()),
            audit: Arc::new(InMemoryAuditStore::new()),
        };
        let services = FeedbackServices::new(stores, mailer.clone(), config);

        Self {
            tenant_id: TenantId::new(),
            feedback,
            approvals,
            mailer,
            router: feedback_router(FeedbackState::new(services.clone())),
            services,
        }
    }

    /// Insert an item created `hours` ago with a guest email.
    pub async fn seed(&self, rating: i32, hours: i64, comment: &str) -> Feedback {
        let mut item = Feedback::new(self.tenant_id, rating, Utc::now() - Duration::hours(hours));
        item.comment = Some(comment.to_string());
        item.guest_email = Some("guest@example.com".to_string());
        item.room_number = Some("101".to_string());
        self.feedback.insert(item.clone()).await;
        item
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response<Body> {
        self.send("POST", uri, Some(body), true).await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send("GET", uri, None, true).await
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        with_tenant: bool,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if with_tenant {
            builder = builder.header(TENANT_HEADER, self.tenant_id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
