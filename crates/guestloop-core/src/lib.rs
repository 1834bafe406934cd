//! guestloop Core Library
//!
//! Shared types for the guest-feedback platform.
//!
//! - [`ids`] - Strongly typed identifiers (TenantId, FeedbackId, ManagerId, ...)

pub mod ids;

pub use ids::{
    ApprovalId, AuditLogId, EmailQueueId, EscalationLogId, FeedbackId, ManagerId, ParseIdError,
    TenantId,
};
