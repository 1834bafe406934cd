//! Human decisions on flagged responses.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use guestloop_core::{ApprovalId, TenantId};

use crate::audit::{AuditAction, AuditEntryInput, AuditStore};
use crate::error::{FeedbackError, Result};
use crate::services::delayed_send::{DelayedSender, SendOutcome};
use crate::store::ApprovalStore;
use crate::types::{ApprovalStatus, ResponseApproval};

/// A recorded decision.
#[derive(Debug, Clone)]
pub struct ApprovalDecision {
    pub approval: ResponseApproval,
    /// Set when an approval arrived after the send cooldown and the
    /// response was dispatched as part of the decision.
    pub send: Option<SendOutcome>,
}

pub struct ApprovalService {
    approvals: Arc<dyn ApprovalStore>,
    audit: Arc<dyn AuditStore>,
    sender: Arc<DelayedSender>,
}

impl ApprovalService {
    pub fn new(
        approvals: Arc<dyn ApprovalStore>,
        audit: Arc<dyn AuditStore>,
        sender: Arc<DelayedSender>,
    ) -> Self {
        Self {
            approvals,
            audit,
            sender,
        }
    }

    pub async fn get(&self, tenant_id: TenantId, id: ApprovalId) -> Result<ResponseApproval> {
        self.approvals
            .get(tenant_id, id)
            .await?
            .ok_or(FeedbackError::ApprovalNotFound(id.into_inner()))
    }

    /// Approve or reject a pending request.
    pub async fn decide(
        &self,
        tenant_id: TenantId,
        id: ApprovalId,
        approved: bool,
        decided_by: Uuid,
        reason: Option<String>,
    ) -> Result<ApprovalDecision> {
        self.decide_at(tenant_id, id, approved, decided_by, reason, Utc::now())
            .await
    }

    /// Approve or reject a pending request as if the clock read `now`.
    ///
    /// An approval given during the send cooldown is left to the scheduled
    /// re-check. One given after it is dispatched here; the send claim keeps
    /// the response from going out twice.
    ///
    /// # Errors
    ///
    /// - `ApprovalNotFound` if the request does not exist in the tenant
    /// - `ApprovalNotPending` if it was already decided or has expired
    #[instrument(skip(self, reason))]
    pub async fn decide_at(
        &self,
        tenant_id: TenantId,
        id: ApprovalId,
        approved: bool,
        decided_by: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ApprovalDecision> {
        let status = if approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        };

        let Some(decided) = self
            .approvals
            .decide(tenant_id, id, status, decided_by, reason)
            .await?
        else {
            // Distinguish a missing request from one that is no longer open.
            return match self.approvals.get(tenant_id, id).await? {
                Some(_) => Err(FeedbackError::ApprovalNotPending(id.into_inner())),
                None => Err(FeedbackError::ApprovalNotFound(id.into_inner())),
            };
        };

        info!(target: "approvals", status = %decided.status, "Approval decided");

        let audit = AuditEntryInput {
            tenant_id: Some(tenant_id),
            action: AuditAction::ResponseApprovalDecided,
            details: serde_json::json!({
                "approval_id": id,
                "status": decided.status.as_str(),
                "decided_by": decided_by,
                "reason": decided.decision_reason,
            }),
        };
        if let Err(e) = self.audit.log(audit).await {
            warn!(target: "approvals", error = %e, "Failed to audit approval decision");
        }

        if decided.status != ApprovalStatus::Approved || !self.sender.cooldown_elapsed(&decided, now)
        {
            return Ok(ApprovalDecision {
                approval: decided,
                send: None,
            });
        }

        let outcome = match self.sender.dispatch_approval_at(tenant_id, id, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(target: "approvals", error = %e, "Send after late approval failed");
                SendOutcome::Suppressed {
                    reason: e.to_string(),
                }
            }
        };
        info!(target: "approvals", outcome = ?outcome, "Dispatched response on late approval");

        let approval = match self.approvals.get(tenant_id, id).await {
            Ok(Some(current)) => current,
            _ => decided,
        };
        Ok(ApprovalDecision {
            approval,
            send: Some(outcome),
        })
    }

    /// Expire every pending request whose window has passed.
    #[instrument(skip(self))]
    pub async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64> {
        let expired = self.approvals.expire_pending(now).await?;
        if expired > 0 {
            info!(target: "approvals", expired, "Expired stale approval requests");
        }
        Ok(expired)
    }
}
