//! Delayed send of screened responses.
//!
//! After screening, a response waits out a short cooldown and the approval
//! record is read again immediately before dispatch. Anything other than a
//! clean low-risk decision or a fresh approval suppresses the send. An
//! approved response is claimed atomically so it goes out at most once.
//!
//! A reviewer who approves after the cooldown has passed finds the scheduled
//! re-check already gone; [`ApprovalService`](crate::ApprovalService) then
//! dispatches through [`DelayedSender::dispatch_approval_at`] itself.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use guestloop_core::{ApprovalId, EmailQueueId, TenantId};

use crate::config::GateConfig;
use crate::email::{EmailMessage, Mailer};
use crate::error::Result;
use crate::services::email_queue::EmailQueueProcessor;
use crate::services::gate::{GateDecision, ResponseDraft};
use crate::store::ApprovalStore;
use crate::types::{ApprovalStatus, ResponseApproval};

/// Result of a delayed send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SendOutcome {
    Sent,
    /// Delivery failed inline and the message was queued for retry.
    Queued { queue_id: EmailQueueId },
    /// Still awaiting a decision; nothing was sent.
    PendingApproval,
    Rejected,
    Expired,
    /// Another dispatcher already claimed this approval.
    AlreadySent,
    /// The approval could not be read; nothing was sent.
    Suppressed { reason: String },
}

impl SendOutcome {
    #[must_use]
    pub fn delivered(&self) -> bool {
        matches!(self, Self::Sent | Self::Queued { .. })
    }
}

pub struct DelayedSender {
    approvals: Arc<dyn ApprovalStore>,
    mailer: Arc<dyn Mailer>,
    queue: Arc<EmailQueueProcessor>,
    config: GateConfig,
}

impl DelayedSender {
    pub fn new(
        approvals: Arc<dyn ApprovalStore>,
        mailer: Arc<dyn Mailer>,
        queue: Arc<EmailQueueProcessor>,
        config: GateConfig,
    ) -> Self {
        Self {
            approvals,
            mailer,
            queue,
            config,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.config.send_delay_secs)
    }

    /// The cooldown for `approval` has run out at `now`, so its scheduled
    /// re-check has already happened or is due.
    #[must_use]
    pub fn cooldown_elapsed(&self, approval: &ResponseApproval, now: DateTime<Utc>) -> bool {
        i64::try_from(self.config.send_delay_secs)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .and_then(|delay| approval.requested_at.checked_add_signed(delay))
            .is_some_and(|due| now >= due)
    }

    /// Wait the cooldown, then dispatch.
    pub async fn send_after_delay(
        &self,
        tenant_id: TenantId,
        decision: &GateDecision,
        draft: &ResponseDraft,
    ) -> Result<SendOutcome> {
        tokio::time::sleep(self.delay()).await;
        self.dispatch(tenant_id, decision, draft).await
    }

    pub async fn dispatch(
        &self,
        tenant_id: TenantId,
        decision: &GateDecision,
        draft: &ResponseDraft,
    ) -> Result<SendOutcome> {
        self.dispatch_at(tenant_id, decision, draft, Utc::now()).await
    }

    /// Re-check and send as if the clock read `now`.
    ///
    /// # Errors
    ///
    /// Only when delivery failed and the retry queue also refused the
    /// message. Approval read failures suppress the send instead.
    #[instrument(skip(self, decision, draft), fields(state = decision.as_str()))]
    pub async fn dispatch_at(
        &self,
        tenant_id: TenantId,
        decision: &GateDecision,
        draft: &ResponseDraft,
        now: DateTime<Utc>,
    ) -> Result<SendOutcome> {
        let approval_id = match decision {
            GateDecision::NotRequired { .. } => {
                let message = draft.to_message(&self.config.from_address);
                return self.deliver(tenant_id, message, now).await;
            }
            GateDecision::Pending { approval_id, .. } => *approval_id,
        };

        self.dispatch_approval_at(tenant_id, approval_id, now).await
    }

    /// Re-read a flagged response's approval and send it if approved.
    ///
    /// # Errors
    ///
    /// Same as [`Self::dispatch_at`].
    #[instrument(skip(self))]
    pub async fn dispatch_approval_at(
        &self,
        tenant_id: TenantId,
        approval_id: ApprovalId,
        now: DateTime<Utc>,
    ) -> Result<SendOutcome> {
        let approval = match self.approvals.get(tenant_id, approval_id).await {
            Ok(Some(approval)) => approval,
            Ok(None) => {
                warn!(target: "delayed_send", %approval_id, "Approval record missing, send suppressed");
                return Ok(SendOutcome::Suppressed {
                    reason: "approval record not found".to_string(),
                });
            }
            Err(e) => {
                warn!(target: "delayed_send", %approval_id, error = %e, "Approval read failed, send suppressed");
                return Ok(SendOutcome::Suppressed {
                    reason: e.to_string(),
                });
            }
        };

        match approval.status {
            ApprovalStatus::Approved => self.send_approved(tenant_id, approval_id, now).await,
            ApprovalStatus::Rejected => {
                info!(target: "delayed_send", %approval_id, "Response rejected, not sending");
                Ok(SendOutcome::Rejected)
            }
            ApprovalStatus::Expired => Ok(SendOutcome::Expired),
            ApprovalStatus::Pending if approval.is_expired_at(now) => {
                if let Err(e) = self.approvals.mark_expired(tenant_id, approval_id).await {
                    warn!(target: "delayed_send", %approval_id, error = %e, "Failed to mark approval expired");
                }
                info!(target: "delayed_send", %approval_id, "Approval window elapsed, not sending");
                Ok(SendOutcome::Expired)
            }
            ApprovalStatus::Pending => {
                info!(target: "delayed_send", %approval_id, "Approval still pending, not sending");
                Ok(SendOutcome::PendingApproval)
            }
        }
    }

    async fn send_approved(
        &self,
        tenant_id: TenantId,
        approval_id: ApprovalId,
        now: DateTime<Utc>,
    ) -> Result<SendOutcome> {
        let claimed = match self.approvals.claim_for_send(tenant_id, approval_id).await {
            Ok(Some(approval)) => approval,
            Ok(None) => return Ok(SendOutcome::AlreadySent),
            Err(e) => {
                warn!(target: "delayed_send", %approval_id, error = %e, "Approval claim failed, send suppressed");
                return Ok(SendOutcome::Suppressed {
                    reason: e.to_string(),
                });
            }
        };

        let message = self.approved_message(&claimed);
        self.deliver(tenant_id, message, now).await
    }

    /// The stored approval is the source of truth for what was approved.
    fn approved_message(&self, approval: &ResponseApproval) -> EmailMessage {
        EmailMessage::new(
            &self.config.from_address,
            &approval.recipient_email,
            &approval.subject,
            &approval.response_text,
        )
    }

    async fn deliver(
        &self,
        tenant_id: TenantId,
        message: EmailMessage,
        now: DateTime<Utc>,
    ) -> Result<SendOutcome> {
        match self.mailer.send(&message).await {
            Ok(()) => {
                info!(target: "delayed_send", to = ?message.to, "Response sent");
                Ok(SendOutcome::Sent)
            }
            Err(e) => {
                warn!(target: "delayed_send", error = %e, "Response send failed, queueing for retry");
                let entry = self.queue.enqueue(Some(tenant_id), message, now).await?;
                Ok(SendOutcome::Queued { queue_id: entry.id })
            }
        }
    }
}
