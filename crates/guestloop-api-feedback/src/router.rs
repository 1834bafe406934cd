//! Router configuration for feedback API.

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use guestloop_feedback::FeedbackServices;

use crate::handlers::{approvals, feedback, jobs, responses};
use crate::jobs::email_queue_job::DEFAULT_BATCH_SIZE;
use crate::openapi::FeedbackApiDoc;

/// Shared state for feedback handlers.
#[derive(Clone)]
pub struct FeedbackState {
    pub services: FeedbackServices,
    /// Entries attempted per email-queue trigger.
    pub email_batch_size: usize,
}

impl FeedbackState {
    #[must_use]
    pub fn new(services: FeedbackServices) -> Self {
        Self {
            services,
            email_batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_email_batch_size(mut self, batch_size: usize) -> Self {
        self.email_batch_size = batch_size.max(1);
        self
    }
}

/// Create the feedback router.
pub fn feedback_router(state: FeedbackState) -> Router {
    Router::new()
        // Scheduler triggers
        .route("/internal/jobs/sla-monitor", post(jobs::run_sla_monitor))
        .route("/internal/jobs/email-queue", post(jobs::run_email_queue))
        .route(
            "/internal/jobs/approval-expiry",
            post(jobs::run_approval_expiry),
        )
        // Manager actions
        .route("/feedback/:id/escalate", post(feedback::escalate_feedback))
        .route(
            "/feedback/:id/acknowledge",
            post(feedback::acknowledge_feedback),
        )
        .route("/feedback/:id/resolve", post(feedback::resolve_feedback))
        // Drafted replies
        .route("/responses/screen", post(responses::screen_response))
        // Approvals
        .route("/approvals/:id", get(approvals::get_approval))
        .route("/approvals/:id/decision", post(approvals::decide_approval))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(FeedbackApiDoc::openapi()) }),
        )
        .with_state(state)
}
