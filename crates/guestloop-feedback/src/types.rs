//! Domain types for the feedback subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use guestloop_core::{
    ApprovalId, EmailQueueId, EscalationLogId, FeedbackId, ManagerId, TenantId,
};
pub use guestloop_db::{ApprovalStatus, EmailQueueStatus, FeedbackStatus};

use crate::email::EmailMessage;
use crate::error::FeedbackError;

/// A guest feedback item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub tenant_id: TenantId,
    pub rating: i32,
    pub comment: Option<String>,
    pub issue_category: Option<String>,
    pub room_number: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub status: FeedbackStatus,
    /// Highest escalation level reached; 0 when never escalated.
    pub escalation_level: i32,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    /// A new pending item created at `created_at`.
    #[must_use]
    pub fn new(tenant_id: TenantId, rating: i32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: FeedbackId::new(),
            tenant_id,
            rating,
            comment: None,
            issue_category: None,
            room_number: None,
            guest_name: None,
            guest_email: None,
            status: FeedbackStatus::Pending,
            escalation_level: 0,
            created_at,
            acknowledged_at: None,
            resolved_at: None,
            updated_at: created_at,
        }
    }

    /// A manager has picked the item up.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged_at.is_some()
            || matches!(
                self.status,
                FeedbackStatus::Acknowledged | FeedbackStatus::InProgress
            )
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some() || self.status.is_terminal()
    }

    /// Fractional hours between creation and `now`.
    #[must_use]
    pub fn hours_since_created(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_seconds() as f64 / 3600.0
    }

    /// Category used for routing; `general` when the guest left it blank.
    #[must_use]
    pub fn category(&self) -> &str {
        self.issue_category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("general")
    }
}

impl TryFrom<guestloop_db::Feedback> for Feedback {
    type Error = FeedbackError;

    fn try_from(row: guestloop_db::Feedback) -> Result<Self, Self::Error> {
        let status = row.status_enum().map_err(FeedbackError::Store)?;
        Ok(Self {
            id: FeedbackId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            rating: row.rating,
            comment: row.comment,
            issue_category: row.issue_category,
            room_number: row.room_number,
            guest_name: row.guest_name,
            guest_email: row.guest_email,
            status,
            escalation_level: row.escalation_level,
            created_at: row.created_at,
            acknowledged_at: row.acknowledged_at,
            resolved_at: row.resolved_at,
            updated_at: row.updated_at,
        })
    }
}

/// Someone who receives reminders or escalations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerContact {
    /// None for static fallback contacts.
    pub id: Option<ManagerId>,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
}

impl From<guestloop_db::ManagerConfiguration> for ManagerContact {
    fn from(row: guestloop_db::ManagerConfiguration) -> Self {
        Self {
            id: Some(ManagerId::from_uuid(row.id)),
            name: row.name,
            email: row.email,
            department: row.department,
        }
    }
}

/// Tenant-configured routing for one category. Unset fields fall back to
/// the static defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantHierarchy {
    pub escalation_hours: Option<f64>,
    pub primary: Option<ManagerContact>,
    pub backup: Option<ManagerContact>,
    pub general_manager: Option<ManagerContact>,
}

/// An append-only escalation log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub id: EscalationLogId,
    pub tenant_id: TenantId,
    pub feedback_id: FeedbackId,
    pub escalation_level: i32,
    pub from_manager_id: Option<ManagerId>,
    pub to_manager_id: Option<ManagerId>,
    pub to_manager_email: String,
    pub to_manager_name: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<guestloop_db::EscalationLog> for EscalationRecord {
    fn from(row: guestloop_db::EscalationLog) -> Self {
        Self {
            id: EscalationLogId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            feedback_id: FeedbackId::from_uuid(row.feedback_id),
            escalation_level: row.escalation_level,
            from_manager_id: row.from_manager_id.map(ManagerId::from_uuid),
            to_manager_id: row.to_manager_id.map(ManagerId::from_uuid),
            to_manager_email: row.to_manager_email,
            to_manager_name: row.to_manager_name,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

/// Input for recording an escalation.
#[derive(Debug, Clone)]
pub struct NewEscalationRecord {
    pub feedback_id: FeedbackId,
    pub escalation_level: i32,
    pub from_manager_id: Option<ManagerId>,
    pub to_manager: ManagerContact,
    pub reason: String,
}

/// A flagged response waiting on, or past, a human decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseApproval {
    pub id: ApprovalId,
    pub tenant_id: TenantId,
    pub feedback_id: Option<FeedbackId>,
    pub response_text: String,
    pub recipient_email: String,
    pub subject: String,
    pub severity_level: String,
    pub risk_factors: Vec<String>,
    pub status: ApprovalStatus,
    pub requested_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_reason: Option<String>,
    pub notification_sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

impl ResponseApproval {
    /// Pending and past its deadline at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ApprovalStatus::Expired
            || (self.status == ApprovalStatus::Pending && self.expires_at <= now)
    }
}

impl TryFrom<guestloop_db::ResponseApproval> for ResponseApproval {
    type Error = FeedbackError;

    fn try_from(row: guestloop_db::ResponseApproval) -> Result<Self, Self::Error> {
        let status = row.status_enum().map_err(FeedbackError::Store)?;
        Ok(Self {
            id: ApprovalId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            feedback_id: row.feedback_id.map(FeedbackId::from_uuid),
            response_text: row.response_text,
            recipient_email: row.recipient_email,
            subject: row.subject,
            severity_level: row.severity_level,
            risk_factors: row.risk_factors,
            status,
            requested_at: row.requested_at,
            expires_at: row.expires_at,
            decided_by: row.decided_by,
            decided_at: row.decided_at,
            decision_reason: row.decision_reason,
            notification_sent: row.notification_sent,
            sent_at: row.sent_at,
        })
    }
}

/// Input for creating an approval request.
#[derive(Debug, Clone)]
pub struct NewResponseApproval {
    pub feedback_id: Option<FeedbackId>,
    pub response_text: String,
    pub recipient_email: String,
    pub subject: String,
    pub severity_level: String,
    pub risk_factors: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

/// An email parked in the retry queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedEmail {
    pub id: EmailQueueId,
    pub tenant_id: Option<TenantId>,
    pub message: EmailMessage,
    pub status: EmailQueueStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub scheduled_for: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl TryFrom<guestloop_db::EmailQueueEntry> for QueuedEmail {
    type Error = FeedbackError;

    fn try_from(row: guestloop_db::EmailQueueEntry) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<EmailQueueStatus>()
            .map_err(FeedbackError::Store)?;
        Ok(Self {
            id: EmailQueueId::from_uuid(row.id),
            tenant_id: row.tenant_id.map(TenantId::from_uuid),
            message: EmailMessage {
                from: row.from_address,
                to: row.to_addresses,
                cc: row.cc_addresses,
                subject: row.subject,
                html: row.html,
            },
            status,
            attempts: row.attempts,
            max_attempts: row.max_attempts,
            scheduled_for: row.scheduled_for,
            last_error: row.last_error,
            created_at: row.created_at,
            sent_at: row.sent_at,
        })
    }
}

/// Input for enqueueing an email.
#[derive(Debug, Clone)]
pub struct NewQueuedEmail {
    pub tenant_id: Option<TenantId>,
    pub message: EmailMessage,
    pub max_attempts: i32,
    pub scheduled_for: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_hours_since_created_is_fractional() {
        let now = Utc::now();
        let item = Feedback::new(TenantId::new(), 4, now - Duration::minutes(90));
        assert!((item.hours_since_created(now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_acknowledged_by_timestamp_or_status() {
        let now = Utc::now();
        let mut item = Feedback::new(TenantId::new(), 3, now);
        assert!(!item.is_acknowledged());

        item.status = FeedbackStatus::InProgress;
        assert!(item.is_acknowledged());

        item.status = FeedbackStatus::Escalated;
        assert!(!item.is_acknowledged());
        item.acknowledged_at = Some(now);
        assert!(item.is_acknowledged());
    }

    #[test]
    fn test_blank_category_routes_to_general() {
        let mut item = Feedback::new(TenantId::new(), 3, Utc::now());
        assert_eq!(item.category(), "general");
        item.issue_category = Some("  ".to_string());
        assert_eq!(item.category(), "general");
        item.issue_category = Some("housekeeping".to_string());
        assert_eq!(item.category(), "housekeeping");
    }

    #[test]
    fn test_db_row_with_unknown_status_is_rejected() {
        let now = Utc::now();
        let row = guestloop_db::Feedback {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            rating: 2,
            comment: None,
            issue_category: None,
            room_number: Some("412".to_string()),
            guest_name: None,
            guest_email: None,
            status: "archived".to_string(),
            escalation_level: 0,
            created_at: now,
            acknowledged_at: None,
            resolved_at: None,
            updated_at: now,
        };
        assert!(matches!(Feedback::try_from(row), Err(FeedbackError::Store(_))));
    }
}
