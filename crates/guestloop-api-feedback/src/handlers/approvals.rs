//! Reviewer endpoints for flagged replies.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use guestloop_core::ApprovalId;

use crate::error::ApiResult;
use crate::models::{ApprovalDecisionRequest, ApprovalResponse};
use crate::router::FeedbackState;
use crate::tenant::TenantContext;

/// Get an approval request.
#[utoipa::path(
    get,
    path = "/approvals/{id}",
    tag = "Feedback - Approvals",
    params(
        ("id" = Uuid, Path, description = "Approval ID"),
        ("X-Tenant-ID" = Uuid, Header, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Approval request", body = ApprovalResponse),
        (status = 404, description = "Approval not found")
    )
)]
pub async fn get_approval(
    State(state): State<FeedbackState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApprovalResponse>> {
    let approval = state
        .services
        .approvals
        .get(tenant_id, ApprovalId::from_uuid(id))
        .await?;
    Ok(Json(approval.into()))
}

/// Approve or reject a pending reply.
///
/// Approving after the send cooldown has passed dispatches the reply as
/// part of the request; `send_outcome` reports what happened.
#[utoipa::path(
    post,
    path = "/approvals/{id}/decision",
    tag = "Feedback - Approvals",
    params(
        ("id" = Uuid, Path, description = "Approval ID"),
        ("X-Tenant-ID" = Uuid, Header, description = "Tenant ID")
    ),
    request_body = ApprovalDecisionRequest,
    responses(
        (status = 200, description = "Decision recorded, with send outcome for a late approval", body = ApprovalResponse),
        (status = 404, description = "Approval not found"),
        (status = 409, description = "Approval already decided or expired")
    )
)]
pub async fn decide_approval(
    State(state): State<FeedbackState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ApprovalDecisionRequest>,
) -> ApiResult<Json<ApprovalResponse>> {
    request.validate()?;

    let decision = state
        .services
        .approvals
        .decide(
            tenant_id,
            ApprovalId::from_uuid(id),
            request.approved,
            request.decided_by,
            request.reason,
        )
        .await?;
    Ok(Json(decision.into()))
}
