//! HTTP surface and background jobs for guest feedback.
//!
//! # Endpoints
//!
//! ## Scheduler triggers
//! - `POST /internal/jobs/sla-monitor` - Run one SLA compliance check
//! - `POST /internal/jobs/email-queue` - Deliver due queued email
//! - `POST /internal/jobs/approval-expiry` - Expire stale approvals
//!
//! ## Manager actions (tenant from `X-Tenant-ID`)
//! - `POST /feedback/:id/escalate`
//! - `POST /feedback/:id/acknowledge`
//! - `POST /feedback/:id/resolve`
//!
//! ## Replies and approvals
//! - `POST /responses/screen` - Screen a drafted reply and schedule its send
//! - `GET /approvals/:id`
//! - `POST /approvals/:id/decision`

pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod openapi;
pub mod router;
pub mod tenant;

pub use error::{ApiFeedbackError, ApiResult, ErrorResponse};
pub use jobs::{
    ApprovalExpirationJob, ApprovalExpirationJobError, ApprovalExpirationStats, EmailQueueJob,
    EmailQueueJobError, SlaMonitoringJob, SlaMonitoringJobError, SlaMonitoringStats,
};
pub use openapi::FeedbackApiDoc;
pub use router::{feedback_router, FeedbackState};
pub use tenant::{TenantContext, TENANT_HEADER};
