//! Tunables for the feedback services.
//!
//! Category routing stored per tenant takes precedence; everything here is
//! the static fallback used when a tenant has not configured a category.

use serde::{Deserialize, Serialize};

use guestloop_core::TenantId;

use crate::types::ManagerContact;

/// Default SLA window in hours before a feedback item escalates.
pub const DEFAULT_ESCALATION_HOURS: f64 = 4.0;

/// Unacknowledged feedback older than this gets a reminder.
pub const DEFAULT_REMINDER_AFTER_HOURS: f64 = 0.5;

/// Default approval timeout in seconds (24 hours).
pub const DEFAULT_APPROVAL_TIMEOUT_SECS: i64 = 86_400;

/// Default cooldown before a screened response is sent (3 minutes).
pub const DEFAULT_SEND_DELAY_SECS: u64 = 180;

/// Default maximum delivery attempts for a queued email.
pub const DEFAULT_MAX_ATTEMPTS: i32 = 5;

/// A contact as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactConfig {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
}

impl ContactConfig {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            department: None,
        }
    }

    /// Convert into a contact with no stored manager record.
    #[must_use]
    pub fn to_contact(&self) -> ManagerContact {
        ManagerContact {
            id: None,
            name: self.name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
        }
    }
}

/// Escalation and SLA settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// SLA window for categories without a tenant override.
    pub default_escalation_hours: f64,
    /// Age at which unacknowledged feedback triggers a reminder.
    pub reminder_after_hours: f64,
    pub default_primary: ContactConfig,
    pub default_backup: Option<ContactConfig>,
    pub default_general_manager: ContactConfig,
    /// Copied on every reminder and escalation.
    pub monitoring_email: String,
    pub from_address: String,
    /// Tenants scanned by the SLA monitor. Empty means all tenants.
    pub tenant_ids: Vec<TenantId>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            default_escalation_hours: DEFAULT_ESCALATION_HOURS,
            reminder_after_hours: DEFAULT_REMINDER_AFTER_HOURS,
            default_primary: ContactConfig {
                name: "Guest Relations".to_string(),
                email: "guest-relations@guestloop.app".to_string(),
                department: Some("Front Office".to_string()),
            },
            default_backup: None,
            default_general_manager: ContactConfig {
                name: "General Manager".to_string(),
                email: "gm@guestloop.app".to_string(),
                department: Some("Management".to_string()),
            },
            monitoring_email: "monitoring@guestloop.app".to_string(),
            from_address: "Guestloop <notifications@guestloop.app>".to_string(),
            tenant_ids: Vec::new(),
        }
    }
}

/// Response risk gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Seconds a flagged response may wait for a decision.
    pub approval_timeout_secs: i64,
    /// Cooldown between screening and the send re-check.
    pub send_delay_secs: u64,
    /// Receives review requests for flagged responses.
    pub reviewer_email: String,
    pub from_address: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            approval_timeout_secs: DEFAULT_APPROVAL_TIMEOUT_SECS,
            send_delay_secs: DEFAULT_SEND_DELAY_SECS,
            reviewer_email: "approvals@guestloop.app".to_string(),
            from_address: "Guestloop <notifications@guestloop.app>".to_string(),
        }
    }
}

/// Email retry queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailQueueConfig {
    pub max_attempts: i32,
    /// Delay after the first failure; doubled on each further failure.
    pub base_backoff_secs: i64,
    pub max_backoff_secs: i64,
}

impl Default for EmailQueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff_secs: 60,
            max_backoff_secs: 3_600,
        }
    }
}

/// All feedback service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub escalation: EscalationConfig,
    pub gate: GateConfig,
    pub email_queue: EmailQueueConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedbackConfig::default();
        assert_eq!(config.escalation.default_escalation_hours, 4.0);
        assert_eq!(config.escalation.reminder_after_hours, 0.5);
        assert_eq!(config.gate.send_delay_secs, 180);
        assert_eq!(config.email_queue.max_attempts, 5);
        assert!(config.escalation.tenant_ids.is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: FeedbackConfig =
            serde_json::from_str(r#"{"gate": {"send_delay_secs": 30}}"#).unwrap();
        assert_eq!(config.gate.send_delay_secs, 30);
        assert_eq!(config.gate.approval_timeout_secs, DEFAULT_APPROVAL_TIMEOUT_SECS);
        assert_eq!(config.escalation.monitoring_email, "monitoring@guestloop.app");
    }
}
