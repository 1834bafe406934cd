//! Escalation manager.
//!
//! Moves a feedback item up the manager hierarchy. The status and level
//! update is authoritative and happens first. The escalation log row and the
//! email are attempted afterwards and their failures are reported, not raised.
//!
//! Manual and timer-driven calls share one rule: the stored level only goes
//! up, so a request at or below the current level is a no-op.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use guestloop_core::{EscalationLogId, FeedbackId, ManagerId, TenantId};

use crate::config::EscalationConfig;
use crate::email::Mailer;
use crate::error::{FeedbackError, Result};
use crate::notifications::escalation_email;
use crate::services::hierarchy::{EscalationTier, HierarchyResolver, MAX_ESCALATION_LEVEL};
use crate::store::{EscalationLogStore, FeedbackStore};
use crate::types::{EscalationRecord, ManagerContact, NewEscalationRecord};

/// Reason recorded for timer-driven escalations.
pub const REASON_SLA_BREACH: &str = "sla_breach";

/// Details of an escalation that moved the item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationReport {
    /// Level stored on the feedback item.
    pub level: i32,
    pub tier: EscalationTier,
    pub target: ManagerContact,
    pub escalation_record_id: Option<EscalationLogId>,
    /// Status and level were written.
    pub persisted: bool,
    /// The escalation log row was written.
    pub audit_recorded: bool,
    /// The target manager's email was accepted.
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_error: Option<String>,
}

/// Result of an escalation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EscalationOutcome {
    Escalated(EscalationReport),
    /// Already with the general manager. Terminal, nothing was sent.
    MaxEscalationReached { current_level: i32 },
    /// Requested level is not above the current one. Nothing was sent.
    AlreadyAtLevel {
        current_level: i32,
        requested_level: i32,
    },
    /// The item is resolved; escalation no longer applies.
    Resolved,
}

impl EscalationOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Escalated(_) => "escalated",
            Self::MaxEscalationReached { .. } => "max_escalation_reached",
            Self::AlreadyAtLevel { .. } => "already_at_level",
            Self::Resolved => "resolved",
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&EscalationReport> {
        match self {
            Self::Escalated(report) => Some(report),
            _ => None,
        }
    }
}

/// Resolves the next manager for a feedback item and hands it over.
pub struct EscalationManager {
    feedback: Arc<dyn FeedbackStore>,
    hierarchy: Arc<HierarchyResolver>,
    logs: Arc<dyn EscalationLogStore>,
    mailer: Arc<dyn Mailer>,
    config: EscalationConfig,
}

impl EscalationManager {
    pub fn new(
        feedback: Arc<dyn FeedbackStore>,
        hierarchy: Arc<HierarchyResolver>,
        logs: Arc<dyn EscalationLogStore>,
        mailer: Arc<dyn Mailer>,
        config: EscalationConfig,
    ) -> Self {
        Self {
            feedback,
            hierarchy,
            logs,
            mailer,
            config,
        }
    }

    /// Escalate a feedback item to `level`.
    ///
    /// # Errors
    ///
    /// - `Validation` if `level < 1`
    /// - `FeedbackNotFound` if the item does not exist in the tenant
    /// - store errors from the hierarchy lookup or the status update
    #[instrument(skip(self, reason))]
    pub async fn escalate(
        &self,
        tenant_id: TenantId,
        feedback_id: FeedbackId,
        level: i32,
        reason: &str,
        from_manager_id: Option<ManagerId>,
    ) -> Result<EscalationOutcome> {
        if level < 1 {
            return Err(FeedbackError::Validation(format!(
                "escalation level must be at least 1, got {level}"
            )));
        }

        let feedback = self
            .feedback
            .get(tenant_id, feedback_id)
            .await?
            .ok_or(FeedbackError::FeedbackNotFound(feedback_id.into_inner()))?;

        if feedback.is_resolved() {
            return Ok(EscalationOutcome::Resolved);
        }

        let current_level = feedback.escalation_level;
        if current_level >= MAX_ESCALATION_LEVEL {
            info!(
                target: "escalation",
                current_level,
                requested_level = level,
                "Maximum escalation reached"
            );
            return Ok(EscalationOutcome::MaxEscalationReached { current_level });
        }

        let target_level = level.min(MAX_ESCALATION_LEVEL);
        if target_level <= current_level {
            return Ok(EscalationOutcome::AlreadyAtLevel {
                current_level,
                requested_level: level,
            });
        }

        let hierarchy = self
            .hierarchy
            .resolve(tenant_id, feedback.category())
            .await?;
        let (tier, target) = hierarchy.target_for_level(target_level);
        let target = target.clone();

        let Some(updated) = self
            .feedback
            .raise_escalation(tenant_id, feedback_id, target_level)
            .await?
        else {
            // Lost a race with another writer; re-read to report the winner.
            let current = self
                .feedback
                .get(tenant_id, feedback_id)
                .await?
                .ok_or(FeedbackError::FeedbackNotFound(feedback_id.into_inner()))?;
            if current.is_resolved() {
                return Ok(EscalationOutcome::Resolved);
            }
            return Ok(EscalationOutcome::AlreadyAtLevel {
                current_level: current.escalation_level,
                requested_level: level,
            });
        };

        let record = self
            .record(tenant_id, feedback_id, target_level, from_manager_id, &target, reason)
            .await;

        let message = escalation_email(&self.config, &updated, &target, tier, target_level, reason);
        let notify_error = match self.mailer.send(&message).await {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    target: "escalation",
                    level = target_level,
                    to = %target.email,
                    error = %e,
                    "Escalation email failed"
                );
                Some(e.to_string())
            }
        };

        info!(
            target: "escalation",
            level = target_level,
            tier = ?tier,
            to = %target.email,
            audit_recorded = record.is_some(),
            notified = notify_error.is_none(),
            "Feedback escalated"
        );

        Ok(EscalationOutcome::Escalated(EscalationReport {
            level: target_level,
            tier,
            target,
            escalation_record_id: record.as_ref().map(|r| r.id),
            persisted: true,
            audit_recorded: record.is_some(),
            notified: notify_error.is_none(),
            notify_error,
        }))
    }

    /// Escalation history for an item, oldest first.
    pub async fn history(
        &self,
        tenant_id: TenantId,
        feedback_id: FeedbackId,
    ) -> Result<Vec<EscalationRecord>> {
        self.logs.list_for_feedback(tenant_id, feedback_id).await
    }

    async fn record(
        &self,
        tenant_id: TenantId,
        feedback_id: FeedbackId,
        level: i32,
        from_manager_id: Option<ManagerId>,
        target: &ManagerContact,
        reason: &str,
    ) -> Option<EscalationRecord> {
        let input = NewEscalationRecord {
            feedback_id,
            escalation_level: level,
            from_manager_id,
            to_manager: target.clone(),
            reason: reason.to_string(),
        };
        match self.logs.record(tenant_id, input).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    target: "escalation",
                    level,
                    error = %e,
                    "Failed to write escalation log"
                );
                None
            }
        }
    }
}
