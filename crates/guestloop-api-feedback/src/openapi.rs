//! OpenAPI document for the feedback API.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers::{approvals, feedback, jobs, responses};
use crate::models::{
    ApprovalDecisionRequest, ApprovalExpiryResponse, ApprovalResponse, EmailQueueRunResponse,
    EscalateFeedbackRequest, EscalationResponse, FeedbackResponse, ScreenResponseRequest,
    ScreenResponseResponse, SlaActionResponse, SlaRunResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Guestloop Feedback API"),
    paths(
        jobs::run_sla_monitor,
        jobs::run_email_queue,
        jobs::run_approval_expiry,
        feedback::escalate_feedback,
        feedback::acknowledge_feedback,
        feedback::resolve_feedback,
        responses::screen_response,
        approvals::get_approval,
        approvals::decide_approval,
    ),
    components(schemas(
        ErrorResponse,
        EscalateFeedbackRequest,
        EscalationResponse,
        FeedbackResponse,
        ScreenResponseRequest,
        ScreenResponseResponse,
        ApprovalDecisionRequest,
        ApprovalResponse,
        SlaActionResponse,
        SlaRunResponse,
        EmailQueueRunResponse,
        ApprovalExpiryResponse,
    )),
    tags(
        (name = "Feedback", description = "Manager actions on guest feedback"),
        (name = "Feedback - Responses", description = "Risk screening of drafted replies"),
        (name = "Feedback - Approvals", description = "Human review of flagged replies"),
        (name = "Feedback - Jobs", description = "Scheduler trigger endpoints")
    )
)]
pub struct FeedbackApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = FeedbackApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/internal/jobs/sla-monitor",
            "/feedback/{id}/escalate",
            "/responses/screen",
            "/approvals/{id}/decision",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
