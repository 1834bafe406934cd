//! Manager actions on feedback items.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use guestloop_core::{FeedbackId, ManagerId};

use crate::error::ApiResult;
use crate::models::{EscalateFeedbackRequest, EscalationResponse, FeedbackResponse};
use crate::router::FeedbackState;
use crate::tenant::TenantContext;

/// Reason recorded when a manager escalates without giving one.
const DEFAULT_MANUAL_REASON: &str = "manual";

/// Escalate a feedback item to a given level.
#[utoipa::path(
    post,
    path = "/feedback/{id}/escalate",
    tag = "Feedback",
    params(
        ("id" = Uuid, Path, description = "Feedback ID"),
        ("X-Tenant-ID" = Uuid, Header, description = "Tenant ID")
    ),
    request_body = EscalateFeedbackRequest,
    responses(
        (status = 200, description = "Escalation outcome", body = EscalationResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Feedback not found")
    )
)]
pub async fn escalate_feedback(
    State(state): State<FeedbackState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<EscalateFeedbackRequest>,
) -> ApiResult<Json<EscalationResponse>> {
    request.validate()?;

    let reason = request
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_MANUAL_REASON);

    let outcome = state
        .services
        .escalation
        .escalate(
            tenant_id,
            FeedbackId::from_uuid(id),
            request.level,
            reason,
            request.from_manager_id.map(ManagerId::from_uuid),
        )
        .await?;

    Ok(Json(outcome.into()))
}

/// Acknowledge a feedback item.
#[utoipa::path(
    post,
    path = "/feedback/{id}/acknowledge",
    tag = "Feedback",
    params(
        ("id" = Uuid, Path, description = "Feedback ID"),
        ("X-Tenant-ID" = Uuid, Header, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Feedback acknowledged", body = FeedbackResponse),
        (status = 404, description = "Feedback not found")
    )
)]
pub async fn acknowledge_feedback(
    State(state): State<FeedbackState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FeedbackResponse>> {
    let item = state
        .services
        .lifecycle
        .acknowledge(tenant_id, FeedbackId::from_uuid(id))
        .await?;
    Ok(Json(item.into()))
}

/// Resolve a feedback item. No further SLA actions run on it.
#[utoipa::path(
    post,
    path = "/feedback/{id}/resolve",
    tag = "Feedback",
    params(
        ("id" = Uuid, Path, description = "Feedback ID"),
        ("X-Tenant-ID" = Uuid, Header, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Feedback resolved", body = FeedbackResponse),
        (status = 404, description = "Feedback not found")
    )
)]
pub async fn resolve_feedback(
    State(state): State<FeedbackState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FeedbackResponse>> {
    let item = state
        .services
        .lifecycle
        .resolve(tenant_id, FeedbackId::from_uuid(id))
        .await?;
    Ok(Json(item.into()))
}
