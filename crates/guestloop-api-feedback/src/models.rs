//! Request and response models for feedback endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use guestloop_feedback::{
    ApprovalDecision, EmailQueueStats, EscalationOutcome, Feedback, GateDecision, ResponseApproval, SendOutcome,
    SlaAction, SlaActionRecord, SlaActionResult, SlaRunReport,
};

// ============================================================================
// Feedback
// ============================================================================

/// Request to escalate a feedback item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EscalateFeedbackRequest {
    /// Target level. 1 = department manager, 2 = backup, 3 = general manager.
    #[validate(range(min = 1, max = 10, message = "Level must be between 1 and 10"))]
    pub level: i32,

    #[validate(length(max = 500, message = "Reason must not exceed 500 characters"))]
    pub reason: Option<String>,

    /// Manager handing the item over, if any.
    pub from_manager_id: Option<Uuid>,
}

/// Feedback item as returned by manager actions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub rating: i32,
    pub status: String,
    pub escalation_level: i32,
    pub issue_category: Option<String>,
    pub room_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id.into_inner(),
            tenant_id: f.tenant_id.into_inner(),
            rating: f.rating,
            status: f.status.as_str().to_string(),
            escalation_level: f.escalation_level,
            issue_category: f.issue_category,
            room_number: f.room_number,
            created_at: f.created_at,
            acknowledged_at: f.acknowledged_at,
            resolved_at: f.resolved_at,
        }
    }
}

/// Result of an escalation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EscalationResponse {
    /// `escalated`, `already_at_level`, `max_escalation_reached` or `resolved`.
    pub outcome: String,
    pub level: Option<i32>,
    pub current_level: Option<i32>,
    pub tier: Option<String>,
    pub target_name: Option<String>,
    pub target_email: Option<String>,
    pub escalation_record_id: Option<Uuid>,
    pub persisted: bool,
    pub audit_recorded: bool,
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_error: Option<String>,
}

impl From<EscalationOutcome> for EscalationResponse {
    fn from(outcome: EscalationOutcome) -> Self {
        let base = Self {
            outcome: outcome.as_str().to_string(),
            ..Default::default()
        };
        match outcome {
            EscalationOutcome::Escalated(report) => Self {
                level: Some(report.level),
                current_level: Some(report.level),
                tier: serde_json::to_value(report.tier)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string)),
                target_name: Some(report.target.name),
                target_email: Some(report.target.email),
                escalation_record_id: report.escalation_record_id.map(|id| id.into_inner()),
                persisted: report.persisted,
                audit_recorded: report.audit_recorded,
                notified: report.notified,
                notify_error: report.notify_error,
                ..base
            },
            EscalationOutcome::MaxEscalationReached { current_level } => Self {
                current_level: Some(current_level),
                ..base
            },
            EscalationOutcome::AlreadyAtLevel {
                current_level,
                requested_level,
            } => Self {
                level: Some(requested_level),
                current_level: Some(current_level),
                ..base
            },
            EscalationOutcome::Resolved => base,
        }
    }
}

// ============================================================================
// Response screening
// ============================================================================

/// Request to screen a drafted reply to a feedback item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScreenResponseRequest {
    pub feedback_id: Uuid,

    /// Drafted reply body (HTML).
    #[validate(length(min = 1, max = 20000, message = "Response text is required (max 20000 characters)"))]
    pub response_text: String,

    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: Option<String>,
}

/// Gate decision for a drafted reply.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScreenResponseResponse {
    /// `not_required` or `pending`.
    pub state: String,
    pub approval_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub high_risk: bool,
    pub severity: Option<String>,
    pub risk_factors: Vec<String>,
    /// Seconds until the send re-check runs.
    pub send_delay_secs: u64,
}

impl ScreenResponseResponse {
    #[must_use]
    pub fn new(decision: &GateDecision, send_delay_secs: u64) -> Self {
        let assessment = decision.assessment();
        let expires_at = match decision {
            GateDecision::Pending { expires_at, .. } => Some(*expires_at),
            GateDecision::NotRequired { .. } => None,
        };
        Self {
            state: decision.as_str().to_string(),
            approval_id: decision.approval_id().map(|id| id.into_inner()),
            expires_at,
            high_risk: assessment.high_risk,
            severity: assessment.severity.map(|s| s.as_str().to_string()),
            risk_factors: assessment.risk_factors.clone(),
            send_delay_secs,
        }
    }
}

/// Outcome of a delayed send, as logged by the background task.
#[must_use]
pub fn send_outcome_label(outcome: &SendOutcome) -> &'static str {
    match outcome {
        SendOutcome::Sent => "sent",
        SendOutcome::Queued { .. } => "queued",
        SendOutcome::PendingApproval => "pending_approval",
        SendOutcome::Rejected => "rejected",
        SendOutcome::Expired => "expired",
        SendOutcome::AlreadySent => "already_sent",
        SendOutcome::Suppressed { .. } => "suppressed",
    }
}

// ============================================================================
// Approvals
// ============================================================================

/// Reviewer decision on a flagged reply.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApprovalDecisionRequest {
    pub approved: bool,
    pub decided_by: Uuid,
    #[validate(length(max = 2000, message = "Reason must not exceed 2000 characters"))]
    pub reason: Option<String>,
}

/// Approval request details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalResponse {
    pub id: Uuid,
    pub feedback_id: Option<Uuid>,
    pub status: String,
    pub severity_level: String,
    pub risk_factors: Vec<String>,
    pub recipient_email: String,
    pub subject: String,
    pub response_text: String,
    pub requested_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_reason: Option<String>,
    pub notification_sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    /// Delivery triggered by this decision, when an approval arrived after
    /// the send cooldown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_outcome: Option<String>,
}

impl From<ResponseApproval> for ApprovalResponse {
    fn from(a: ResponseApproval) -> Self {
        Self {
            id: a.id.into_inner(),
            feedback_id: a.feedback_id.map(|id| id.into_inner()),
            status: a.status.as_str().to_string(),
            severity_level: a.severity_level,
            risk_factors: a.risk_factors,
            recipient_email: a.recipient_email,
            subject: a.subject,
            response_text: a.response_text,
            requested_at: a.requested_at,
            expires_at: a.expires_at,
            decided_by: a.decided_by,
            decided_at: a.decided_at,
            decision_reason: a.decision_reason,
            notification_sent: a.notification_sent,
            sent_at: a.sent_at,
            send_outcome: None,
        }
    }
}

impl From<ApprovalDecision> for ApprovalResponse {
    fn from(decision: ApprovalDecision) -> Self {
        let send_outcome = decision
            .send
            .as_ref()
            .map(|outcome| send_outcome_label(outcome).to_string());
        Self {
            send_outcome,
            ..decision.approval.into()
        }
    }
}

// ============================================================================
// Scheduler triggers
// ============================================================================

/// One acted-upon item in an SLA run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlaActionResponse {
    pub feedback_id: Uuid,
    pub tenant_id: Uuid,
    pub hours_since_created: f64,
    /// `reminder` or `escalation`.
    pub action: String,
    pub level: Option<i32>,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SlaActionRecord> for SlaActionResponse {
    fn from(r: SlaActionRecord) -> Self {
        let (action, level) = match r.action {
            SlaAction::None => ("none", None),
            SlaAction::Reminder { level } => ("reminder", Some(level)),
            SlaAction::Escalation { level } => ("escalation", Some(level)),
        };
        let (result, error) = match r.result {
            SlaActionResult::ReminderSent => ("reminder_sent", None),
            SlaActionResult::Escalated { .. } => ("escalated", None),
            SlaActionResult::MaxEscalationReached => ("max_escalation_reached", None),
            SlaActionResult::AlreadyAtLevel => ("already_at_level", None),
            SlaActionResult::Skipped => ("skipped", None),
            SlaActionResult::Failed { error } => ("failed", Some(error)),
        };
        Self {
            feedback_id: r.feedback_id.into_inner(),
            tenant_id: r.tenant_id.into_inner(),
            hours_since_created: r.hours_since_created,
            action: action.to_string(),
            level,
            result: result.to_string(),
            error,
        }
    }
}

/// Summary of one SLA compliance check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlaRunResponse {
    pub checked: usize,
    pub reminders_sent: usize,
    pub escalated: usize,
    pub max_escalation_reached: usize,
    pub notify_failures: usize,
    pub skipped: usize,
    pub failed: usize,
    pub actions: Vec<SlaActionResponse>,
}

impl From<SlaRunReport> for SlaRunResponse {
    fn from(r: SlaRunReport) -> Self {
        Self {
            checked: r.checked,
            reminders_sent: r.reminders_sent,
            escalated: r.escalated,
            max_escalation_reached: r.max_escalation_reached,
            notify_failures: r.notify_failures,
            skipped: r.skipped,
            failed: r.failed,
            actions: r.actions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Summary of one email queue pass.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmailQueueRunResponse {
    pub processed: usize,
    pub sent: usize,
    pub retrying: usize,
    pub failed: usize,
}

impl From<EmailQueueStats> for EmailQueueRunResponse {
    fn from(s: EmailQueueStats) -> Self {
        Self {
            processed: s.processed,
            sent: s.sent,
            retrying: s.retrying,
            failed: s.failed,
        }
    }
}

/// Summary of one approval expiry pass.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalExpiryResponse {
    pub expired: u64,
}
