//! Scheduler trigger endpoints.
//!
//! An external scheduler (cron, Cloud Scheduler) may drive the passes over
//! HTTP instead of the in-process loops. A failed scan maps to a non-2xx
//! status so the scheduler records the failure.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::{ApiResult, ErrorResponse};
use crate::models::{ApprovalExpiryResponse, EmailQueueRunResponse, SlaRunResponse};
use crate::router::FeedbackState;

/// Run one SLA compliance check.
#[utoipa::path(
    post,
    path = "/internal/jobs/sla-monitor",
    tag = "Feedback - Jobs",
    responses(
        (status = 200, description = "Compliance check report", body = SlaRunResponse),
        (status = 500, description = "Scan failed", body = ErrorResponse)
    )
)]
pub async fn run_sla_monitor(State(state): State<FeedbackState>) -> ApiResult<Json<SlaRunResponse>> {
    let report = state.services.sla_monitor.check_compliance().await?;
    Ok(Json(report.into()))
}

/// Deliver due entries from the email retry queue.
#[utoipa::path(
    post,
    path = "/internal/jobs/email-queue",
    tag = "Feedback - Jobs",
    responses(
        (status = 200, description = "Queue pass summary", body = EmailQueueRunResponse),
        (status = 500, description = "Queue read failed", body = ErrorResponse)
    )
)]
pub async fn run_email_queue(
    State(state): State<FeedbackState>,
) -> ApiResult<Json<EmailQueueRunResponse>> {
    let stats = state
        .services
        .email_queue
        .process_due(Utc::now(), state.email_batch_size)
        .await?;
    Ok(Json(stats.into()))
}

/// Expire approvals past their deadline.
#[utoipa::path(
    post,
    path = "/internal/jobs/approval-expiry",
    tag = "Feedback - Jobs",
    responses(
        (status = 200, description = "Number of expired approvals", body = ApprovalExpiryResponse),
        (status = 500, description = "Update failed", body = ErrorResponse)
    )
)]
pub async fn run_approval_expiry(
    State(state): State<FeedbackState>,
) -> ApiResult<Json<ApprovalExpiryResponse>> {
    let expired = state.services.approvals.expire_pending(Utc::now()).await?;
    Ok(Json(ApprovalExpiryResponse { expired }))
}
