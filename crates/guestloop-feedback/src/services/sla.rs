//! SLA compliance monitor.
//!
//! One pass scans every unresolved feedback item, decides whether it needs
//! a reminder or an escalation, and triggers it. Items are processed one at
//! a time; a failure on one item is logged and counted and the pass moves
//! on. Only a failed scan query aborts the pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use guestloop_core::{FeedbackId, TenantId};

use crate::audit::{AuditAction, AuditEntryInput, AuditStore};
use crate::config::EscalationConfig;
use crate::email::Mailer;
use crate::error::Result;
use crate::notifications::reminder_email;
use crate::services::escalation::{EscalationManager, EscalationOutcome, REASON_SLA_BREACH};
use crate::services::hierarchy::HierarchyResolver;
use crate::store::FeedbackStore;
use crate::types::Feedback;

/// Timer-driven action for one feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SlaAction {
    None,
    Reminder { level: i32 },
    Escalation { level: i32 },
}

/// Decide the action for an item `hours` old.
///
/// Escalation is checked before the reminder: an unacknowledged item past
/// its window escalates rather than getting another reminder. The level is
/// `floor(hours / escalation_hours) + 1`.
#[must_use]
pub fn decide_action(
    hours: f64,
    acknowledged: bool,
    escalation_hours: f64,
    reminder_after_hours: f64,
) -> SlaAction {
    if !hours.is_finite() || hours < reminder_after_hours {
        return SlaAction::None;
    }

    if escalation_hours > 0.0 && hours >= escalation_hours {
        let level = (hours / escalation_hours).floor() as i32 + 1;
        return SlaAction::Escalation { level };
    }

    if acknowledged {
        SlaAction::None
    } else {
        SlaAction::Reminder { level: 1 }
    }
}

/// What happened to an item that needed an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SlaActionResult {
    ReminderSent,
    Escalated { notified: bool, audit_recorded: bool },
    MaxEscalationReached,
    AlreadyAtLevel,
    Skipped,
    Failed { error: String },
}

/// One acted-upon item, for logging and the trigger response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaActionRecord {
    pub feedback_id: FeedbackId,
    pub tenant_id: TenantId,
    pub hours_since_created: f64,
    pub action: SlaAction,
    pub result: SlaActionResult,
}

/// Outcome of one monitor pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlaRunReport {
    pub checked: usize,
    pub reminders_sent: usize,
    pub escalated: usize,
    pub max_escalation_reached: usize,
    /// Escalations that were persisted but whose email failed.
    pub notify_failures: usize,
    pub skipped: usize,
    pub failed: usize,
    pub actions: Vec<SlaActionRecord>,
}

/// Periodic SLA scanner.
pub struct SlaMonitor {
    feedback: Arc<dyn FeedbackStore>,
    hierarchy: Arc<HierarchyResolver>,
    escalation: Arc<EscalationManager>,
    mailer: Arc<dyn Mailer>,
    audit: Arc<dyn AuditStore>,
    config: EscalationConfig,
}

impl SlaMonitor {
    pub fn new(
        feedback: Arc<dyn FeedbackStore>,
        hierarchy: Arc<HierarchyResolver>,
        escalation: Arc<EscalationManager>,
        mailer: Arc<dyn Mailer>,
        audit: Arc<dyn AuditStore>,
        config: EscalationConfig,
    ) -> Self {
        Self {
            feedback,
            hierarchy,
            escalation,
            mailer,
            audit,
            config,
        }
    }

    /// Run one pass against the current time.
    pub async fn check_compliance(&self) -> Result<SlaRunReport> {
        self.check_compliance_at(Utc::now()).await
    }

    /// Run one pass as if the clock read `now`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the scan query fails. Per-item failures
    /// are counted in the report instead.
    #[instrument(skip(self))]
    pub async fn check_compliance_at(&self, now: DateTime<Utc>) -> Result<SlaRunReport> {
        let items = self.feedback.list_open(&self.config.tenant_ids).await?;
        let mut report = SlaRunReport {
            checked: items.len(),
            ..Default::default()
        };

        for item in &items {
            if item.is_resolved() {
                report.skipped += 1;
                continue;
            }

            if let Some(record) = self.process_item(item, now).await {
                match &record.result {
                    SlaActionResult::ReminderSent => report.reminders_sent += 1,
                    SlaActionResult::Escalated { notified, .. } => {
                        report.escalated += 1;
                        if !notified {
                            report.notify_failures += 1;
                        }
                    }
                    SlaActionResult::MaxEscalationReached => report.max_escalation_reached += 1,
                    SlaActionResult::AlreadyAtLevel | SlaActionResult::Skipped => {
                        report.skipped += 1;
                    }
                    SlaActionResult::Failed { .. } => report.failed += 1,
                }
                report.actions.push(record);
            }
        }

        debug!(
            target: "sla_monitor",
            checked = report.checked,
            reminders_sent = report.reminders_sent,
            escalated = report.escalated,
            max_escalation_reached = report.max_escalation_reached,
            skipped = report.skipped,
            failed = report.failed,
            "SLA compliance check complete"
        );

        self.write_audit(&report).await;
        Ok(report)
    }

    async fn process_item(&self, item: &Feedback, now: DateTime<Utc>) -> Option<SlaActionRecord> {
        let hours = item.hours_since_created(now);

        let hierarchy = match self.hierarchy.resolve(item.tenant_id, item.category()).await {
            Ok(h) => h,
            Err(e) => {
                warn!(
                    target: "sla_monitor",
                    feedback_id = %item.id,
                    error = %e,
                    "Failed to resolve hierarchy"
                );
                return Some(SlaActionRecord {
                    feedback_id: item.id,
                    tenant_id: item.tenant_id,
                    hours_since_created: hours,
                    action: SlaAction::None,
                    result: SlaActionResult::Failed {
                        error: e.to_string(),
                    },
                });
            }
        };

        let action = decide_action(
            hours,
            item.is_acknowledged(),
            hierarchy.escalation_hours,
            self.config.reminder_after_hours,
        );

        let result = match action {
            SlaAction::None => return None,
            SlaAction::Reminder { .. } => {
                let message = reminder_email(&self.config, item, &hierarchy.primary, hours);
                match self.mailer.send(&message).await {
                    Ok(()) => {
                        debug!(
                            target: "sla_monitor",
                            feedback_id = %item.id,
                            to = %hierarchy.primary.email,
                            "Reminder sent"
                        );
                        SlaActionResult::ReminderSent
                    }
                    Err(e) => {
                        warn!(
                            target: "sla_monitor",
                            feedback_id = %item.id,
                            error = %e,
                            "Reminder email failed"
                        );
                        SlaActionResult::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
            SlaAction::Escalation { level } => {
                match self
                    .escalation
                    .escalate(item.tenant_id, item.id, level, REASON_SLA_BREACH, None)
                    .await
                {
                    Ok(EscalationOutcome::Escalated(report)) => SlaActionResult::Escalated {
                        notified: report.notified,
                        audit_recorded: report.audit_recorded,
                    },
                    Ok(EscalationOutcome::MaxEscalationReached { .. }) => {
                        SlaActionResult::MaxEscalationReached
                    }
                    Ok(EscalationOutcome::AlreadyAtLevel { .. }) => SlaActionResult::AlreadyAtLevel,
                    Ok(EscalationOutcome::Resolved) => SlaActionResult::Skipped,
                    Err(e) => {
                        warn!(
                            target: "sla_monitor",
                            feedback_id = %item.id,
                            level,
                            error = %e,
                            "Escalation failed"
                        );
                        SlaActionResult::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
        };

        Some(SlaActionRecord {
            feedback_id: item.id,
            tenant_id: item.tenant_id,
            hours_since_created: hours,
            action,
            result,
        })
    }

    async fn write_audit(&self, report: &SlaRunReport) {
        let tenant_id = match self.config.tenant_ids.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        let input = AuditEntryInput {
            tenant_id,
            action: AuditAction::SlaComplianceCheck,
            details: serde_json::json!({
                "checked": report.checked,
                "reminders_sent": report.reminders_sent,
                "escalated": report.escalated,
                "max_escalation_reached": report.max_escalation_reached,
                "notify_failures": report.notify_failures,
                "skipped": report.skipped,
                "failed": report.failed,
            }),
        };

        if let Err(e) = self.audit.log(input).await {
            warn!(target: "sla_monitor", error = %e, "Failed to write SLA audit entry");
        }
    }
}
