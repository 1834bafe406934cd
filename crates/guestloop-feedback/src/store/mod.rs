//! Storage traits for the feedback subsystem.
//!
//! Services only see these traits. [`memory`] holds the in-memory
//! implementations used by tests; [`postgres`] delegates to the
//! `guestloop-db` row models.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use guestloop_core::{ApprovalId, EmailQueueId, FeedbackId, TenantId};

use crate::audit::AuditStore;
use crate::error::Result;
use crate::types::{
    ApprovalStatus, EscalationRecord, Feedback, NewEscalationRecord, NewQueuedEmail,
    NewResponseApproval, QueuedEmail, ResponseApproval, TenantHierarchy,
};

pub use memory::{
    InMemoryApprovalStore, InMemoryEmailQueueStore, InMemoryEscalationLogStore,
    InMemoryFeedbackStore, InMemoryHierarchyStore,
};
pub use postgres::{
    PgApprovalStore, PgAuditStore, PgEmailQueueStore, PgEscalationLogStore, PgFeedbackStore,
    PgHierarchyStore,
};

/// Feedback rows.
#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn get(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>>;

    /// Unresolved items, oldest first. An empty filter means every tenant.
    async fn list_open(&self, tenant_ids: &[TenantId]) -> Result<Vec<Feedback>>;

    /// Set status `escalated` and raise the level to `level`.
    ///
    /// Returns None when the item is missing, resolved, or already at or
    /// above `level`.
    async fn raise_escalation(
        &self,
        tenant_id: TenantId,
        id: FeedbackId,
        level: i32,
    ) -> Result<Option<Feedback>>;

    /// Stamp `acknowledged_at` if unset.
    async fn acknowledge(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>>;

    /// Stamp `resolved_at` if unset and mark resolved.
    async fn resolve(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>>;
}

/// Tenant category routing.
#[async_trait::async_trait]
pub trait HierarchyStore: Send + Sync {
    async fn find_for_category(
        &self,
        tenant_id: TenantId,
        category: &str,
    ) -> Result<Option<TenantHierarchy>>;
}

/// Append-only escalation log.
#[async_trait::async_trait]
pub trait EscalationLogStore: Send + Sync {
    async fn record(&self, tenant_id: TenantId, input: NewEscalationRecord)
        -> Result<EscalationRecord>;

    async fn list_for_feedback(
        &self,
        tenant_id: TenantId,
        feedback_id: FeedbackId,
    ) -> Result<Vec<EscalationRecord>>;
}

/// Response approval records.
#[async_trait::async_trait]
pub trait ApprovalStore: Send + Sync {
    async fn create(
        &self,
        tenant_id: TenantId,
        input: NewResponseApproval,
    ) -> Result<ResponseApproval>;

    async fn get(&self, tenant_id: TenantId, id: ApprovalId) -> Result<Option<ResponseApproval>>;

    /// Move a pending, unexpired request to `status`.
    async fn decide(
        &self,
        tenant_id: TenantId,
        id: ApprovalId,
        status: ApprovalStatus,
        decided_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<ResponseApproval>>;

    async fn mark_expired(&self, tenant_id: TenantId, id: ApprovalId) -> Result<bool>;

    /// Expire every pending request due at `now`. Returns how many changed.
    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64>;

    async fn mark_notification_sent(&self, tenant_id: TenantId, id: ApprovalId) -> Result<bool>;

    /// Atomically take an approved, unsent request. At most one caller wins.
    async fn claim_for_send(
        &self,
        tenant_id: TenantId,
        id: ApprovalId,
    ) -> Result<Option<ResponseApproval>>;
}

/// Email retry queue.
#[async_trait::async_trait]
pub trait EmailQueueStore: Send + Sync {
    async fn enqueue(&self, input: NewQueuedEmail) -> Result<QueuedEmail>;

    /// Oldest queued entry scheduled at or before `now`.
    async fn next_due(&self, now: DateTime<Utc>) -> Result<Option<QueuedEmail>>;

    async fn mark_sent(&self, id: EmailQueueId, attempts: i32, sent_at: DateTime<Utc>)
        -> Result<bool>;

    async fn reschedule(
        &self,
        id: EmailQueueId,
        attempts: i32,
        scheduled_for: DateTime<Utc>,
        last_error: &str,
    ) -> Result<bool>;

    async fn mark_failed(&self, id: EmailQueueId, attempts: i32, last_error: &str) -> Result<bool>;
}

/// Every store the feedback services need.
#[derive(Clone)]
pub struct FeedbackStores {
    pub feedback: Arc<dyn FeedbackStore>,
    pub hierarchy: Arc<dyn HierarchyStore>,
    pub escalation_logs: Arc<dyn EscalationLogStore>,
    pub approvals: Arc<dyn ApprovalStore>,
    pub email_queue: Arc<dyn EmailQueueStore>,
    pub audit: Arc<dyn AuditStore>,
}

impl FeedbackStores {
    /// PostgreSQL-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            feedback: Arc::new(PgFeedbackStore::new(pool.clone())),
            hierarchy: Arc::new(PgHierarchyStore::new(pool.clone())),
            escalation_logs: Arc::new(PgEscalationLogStore::new(pool.clone())),
            approvals: Arc::new(PgApprovalStore::new(pool.clone())),
            email_queue: Arc::new(PgEmailQueueStore::new(pool.clone())),
            audit: Arc::new(PgAuditStore::new(pool)),
        }
    }
}
