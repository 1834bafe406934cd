//! Background jobs for feedback SLA tracking.
//!
//! - SLA monitoring: scans open feedback for reminders and escalations
//! - Email queue: retries mail that could not be delivered inline
//! - Approval expiry: expires flagged replies nobody decided on

pub mod approval_expiration_job;
pub mod email_queue_job;
pub mod sla_monitoring_job;

pub use approval_expiration_job::{
    ApprovalExpirationJob, ApprovalExpirationJobError, ApprovalExpirationStats,
};
pub use email_queue_job::{EmailQueueJob, EmailQueueJobError};
pub use sla_monitoring_job::{SlaMonitoringJob, SlaMonitoringJobError, SlaMonitoringStats};
