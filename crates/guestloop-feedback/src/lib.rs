//! Guest feedback SLA tracking and response gating.
//!
//! - [`SlaMonitor`] scans open feedback on a schedule and sends reminders or
//!   escalations.
//! - [`EscalationManager`] walks the manager hierarchy (primary, backup,
//!   general manager) and records each hand-off.
//! - [`ResponseRiskGate`] and [`DelayedSender`] keep risky drafted replies
//!   away from guests until a human has approved them.
//! - [`EmailQueueProcessor`] retries mail that could not be sent inline.
//!
//! Services depend only on the traits in [`store`]. Tests use the in-memory
//! stores; the server wires [`FeedbackStores::postgres`].

pub mod audit;
pub mod config;
pub mod email;
pub mod error;
pub mod notifications;
pub mod services;
pub mod store;
pub mod types;

pub use audit::{AuditAction, AuditEntry, AuditEntryInput, AuditStore, InMemoryAuditStore};
pub use config::{ContactConfig, EmailQueueConfig, EscalationConfig, FeedbackConfig, GateConfig};
pub use email::{EmailMessage, HttpMailer, InMemoryMailer, Mailer};
pub use error::{FeedbackError, Result};
pub use services::*;
pub use store::{
    ApprovalStore, EmailQueueStore, EscalationLogStore, FeedbackStore, FeedbackStores,
    HierarchyStore, InMemoryApprovalStore, InMemoryEmailQueueStore, InMemoryEscalationLogStore,
    InMemoryFeedbackStore, InMemoryHierarchyStore,
};
pub use types::{
    ApprovalStatus, EmailQueueStatus, EscalationRecord, Feedback, FeedbackStatus,
    ManagerContact, QueuedEmail, ResponseApproval, TenantHierarchy,
};
