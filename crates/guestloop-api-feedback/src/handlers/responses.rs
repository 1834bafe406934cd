//! Screening of drafted guest replies.

use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use guestloop_core::FeedbackId;
use guestloop_feedback::ResponseDraft;

use crate::error::{ApiFeedbackError, ApiResult};
use crate::models::{send_outcome_label, ScreenResponseRequest, ScreenResponseResponse};
use crate::router::FeedbackState;
use crate::tenant::TenantContext;

const DEFAULT_SUBJECT: &str = "Thank you for your feedback";

/// Screen a drafted reply and schedule its delayed send.
///
/// The reply goes to the guest who left the feedback. Flagged replies are
/// only sent if a reviewer approves them before the send re-check runs.
#[utoipa::path(
    post,
    path = "/responses/screen",
    tag = "Feedback - Responses",
    params(("X-Tenant-ID" = Uuid, Header, description = "Tenant ID")),
    request_body = ScreenResponseRequest,
    responses(
        (status = 202, description = "Reply screened and send scheduled", body = ScreenResponseResponse),
        (status = 400, description = "Invalid request or feedback has no guest email"),
        (status = 404, description = "Feedback not found"),
        (status = 503, description = "Approval record could not be created; nothing will be sent")
    )
)]
pub async fn screen_response(
    State(state): State<FeedbackState>,
    TenantContext(tenant_id): TenantContext,
    Json(request): Json<ScreenResponseRequest>,
) -> ApiResult<(StatusCode, Json<ScreenResponseResponse>)> {
    request.validate()?;

    let feedback_id = FeedbackId::from_uuid(request.feedback_id);
    let feedback = state.services.lifecycle.get(tenant_id, feedback_id).await?;
    let recipient_email = feedback
        .guest_email
        .clone()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| {
            ApiFeedbackError::Validation("Feedback has no guest email to reply to".to_string())
        })?;

    let draft = ResponseDraft {
        feedback_id: Some(feedback_id),
        feedback_text: feedback.comment.clone().unwrap_or_default(),
        rating: feedback.rating,
        recipient_email,
        subject: request
            .subject
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        response_html: request.response_text,
    };

    let decision = state.services.gate.screen(tenant_id, &draft).await?;
    let sender = state.services.delayed_sender.clone();
    let response = ScreenResponseResponse::new(&decision, sender.delay().as_secs());

    tokio::spawn(async move {
        match sender.send_after_delay(tenant_id, &decision, &draft).await {
            Ok(outcome) => info!(
                target: "delayed_send",
                feedback_id = %feedback_id,
                outcome = send_outcome_label(&outcome),
                "Delayed send finished"
            ),
            Err(e) => warn!(
                target: "delayed_send",
                feedback_id = %feedback_id,
                error = %e,
                "Delayed send failed"
            ),
        }
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}
