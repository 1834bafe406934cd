//! Database entity models for guestloop-db.

pub mod audit_log;
pub mod category_routing;
pub mod email_queue;
pub mod escalation_log;
pub mod feedback;
pub mod manager_configuration;
pub mod response_approval;

pub use audit_log::{AuditLog, CreateAuditLog};
pub use category_routing::CategoryRoutingConfiguration;
pub use email_queue::{CreateEmailQueueEntry, EmailQueueEntry, EmailQueueStatus};
pub use escalation_log::{CreateEscalationLog, EscalationLog};
pub use feedback::{Feedback, FeedbackStatus};
pub use manager_configuration::ManagerConfiguration;
pub use response_approval::{ApprovalStatus, CreateResponseApproval, ResponseApproval};
