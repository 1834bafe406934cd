//! Response risk gate.
//!
//! Every drafted guest response passes through [`ResponseRiskGate::screen`]
//! before it may be sent. Low-risk drafts are cleared immediately. Flagged
//! drafts get a pending approval record that a human must approve before the
//! delayed sender will deliver them. If that record cannot be written the
//! gate fails closed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use guestloop_core::{ApprovalId, FeedbackId, TenantId};

use crate::audit::{AuditAction, AuditEntryInput, AuditStore};
use crate::config::GateConfig;
use crate::email::{EmailMessage, Mailer};
use crate::error::{FeedbackError, Result};
use crate::notifications::approval_request_email;
use crate::services::risk::{RiskAssessment, RiskClassifier, Severity};
use crate::store::ApprovalStore;
use crate::types::NewResponseApproval;

/// A drafted response awaiting screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseDraft {
    pub feedback_id: Option<FeedbackId>,
    /// Guest text the response answers. Classified together with the rating.
    pub feedback_text: String,
    pub rating: i32,
    pub recipient_email: String,
    pub subject: String,
    pub response_html: String,
}

impl ResponseDraft {
    /// The outbound message for this draft.
    #[must_use]
    pub fn to_message(&self, from: &str) -> EmailMessage {
        EmailMessage::new(
            from,
            &self.recipient_email,
            &self.subject,
            &self.response_html,
        )
    }
}

/// Result of screening a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateDecision {
    /// Low risk; the draft may be sent without review.
    NotRequired { assessment: RiskAssessment },
    /// Flagged; sending waits on the approval record.
    Pending {
        approval_id: ApprovalId,
        expires_at: DateTime<Utc>,
        assessment: RiskAssessment,
    },
}

impl GateDecision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequired { .. } => "not_required",
            Self::Pending { .. } => "pending",
        }
    }

    #[must_use]
    pub fn approval_id(&self) -> Option<ApprovalId> {
        match self {
            Self::NotRequired { .. } => None,
            Self::Pending { approval_id, .. } => Some(*approval_id),
        }
    }

    #[must_use]
    pub fn assessment(&self) -> &RiskAssessment {
        match self {
            Self::NotRequired { assessment } | Self::Pending { assessment, .. } => assessment,
        }
    }
}

pub struct ResponseRiskGate {
    classifier: Arc<dyn RiskClassifier>,
    approvals: Arc<dyn ApprovalStore>,
    mailer: Arc<dyn Mailer>,
    audit: Arc<dyn AuditStore>,
    config: GateConfig,
}

impl ResponseRiskGate {
    pub fn new(
        classifier: Arc<dyn RiskClassifier>,
        approvals: Arc<dyn ApprovalStore>,
        mailer: Arc<dyn Mailer>,
        audit: Arc<dyn AuditStore>,
        config: GateConfig,
    ) -> Self {
        Self {
            classifier,
            approvals,
            mailer,
            audit,
            config,
        }
    }

    /// Classify text without side effects.
    #[must_use]
    pub fn evaluate(&self, text: &str, rating: i32) -> RiskAssessment {
        self.classifier.assess(text, rating)
    }

    pub async fn screen(&self, tenant_id: TenantId, draft: &ResponseDraft) -> Result<GateDecision> {
        self.screen_at(tenant_id, draft, Utc::now()).await
    }

    /// Screen a draft as if the clock read `now`.
    ///
    /// # Errors
    ///
    /// Returns `RiskGate` when the approval record cannot be created. The
    /// caller must not send in that case.
    #[instrument(skip(self, draft), fields(feedback_id = ?draft.feedback_id))]
    pub async fn screen_at(
        &self,
        tenant_id: TenantId,
        draft: &ResponseDraft,
        now: DateTime<Utc>,
    ) -> Result<GateDecision> {
        let assessment = self.evaluate(&draft.feedback_text, draft.rating);

        if !assessment.high_risk {
            return Ok(GateDecision::NotRequired { assessment });
        }

        let expires_at = now + Duration::seconds(self.config.approval_timeout_secs);
        let input = NewResponseApproval {
            feedback_id: draft.feedback_id,
            response_text: draft.response_html.clone(),
            recipient_email: draft.recipient_email.clone(),
            subject: draft.subject.clone(),
            severity_level: assessment
                .severity
                .unwrap_or(Severity::High)
                .as_str()
                .to_string(),
            risk_factors: assessment.risk_factors.clone(),
            expires_at,
        };

        let approval = self.approvals.create(tenant_id, input).await.map_err(|e| {
            warn!(target: "risk_gate", error = %e, "Failed to create approval request");
            FeedbackError::RiskGate(format!("could not create approval request: {e}"))
        })?;

        info!(
            target: "risk_gate",
            approval_id = %approval.id,
            risk_factors = ?approval.risk_factors,
            "Response flagged for human approval"
        );

        let message = approval_request_email(&self.config, &approval);
        match self.mailer.send(&message).await {
            Ok(()) => {
                if let Err(e) = self
                    .approvals
                    .mark_notification_sent(tenant_id, approval.id)
                    .await
                {
                    warn!(target: "risk_gate", error = %e, "Failed to mark reviewer notified");
                }
            }
            Err(e) => {
                warn!(
                    target: "risk_gate",
                    approval_id = %approval.id,
                    error = %e,
                    "Reviewer notification failed"
                );
            }
        }

        let audit = AuditEntryInput {
            tenant_id: Some(tenant_id),
            action: AuditAction::ResponseApprovalRequested,
            details: serde_json::json!({
                "approval_id": approval.id,
                "feedback_id": draft.feedback_id,
                "risk_factors": approval.risk_factors,
                "expires_at": expires_at,
            }),
        };
        if let Err(e) = self.audit.log(audit).await {
            warn!(target: "risk_gate", error = %e, "Failed to audit approval request");
        }

        Ok(GateDecision::Pending {
            approval_id: approval.id,
            expires_at,
            assessment,
        })
    }
}
