//! PostgreSQL-backed stores.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use guestloop_core::{ApprovalId, AuditLogId, EmailQueueId, FeedbackId, TenantId};
use guestloop_db::{
    AuditLog, CategoryRoutingConfiguration, CreateAuditLog, CreateEmailQueueEntry,
    CreateEscalationLog, CreateResponseApproval, EmailQueueEntry, EscalationLog,
    ManagerConfiguration,
};

use super::{ApprovalStore, EmailQueueStore, EscalationLogStore, FeedbackStore, HierarchyStore};
use crate::audit::{AuditEntry, AuditEntryInput, AuditStore};
use crate::error::Result;
use crate::types::{
    ApprovalStatus, EscalationRecord, Feedback, ManagerContact, NewEscalationRecord,
    NewQueuedEmail, NewResponseApproval, QueuedEmail, ResponseApproval, TenantHierarchy,
};

/// Convert scanned rows. A row that cannot be interpreted is logged and
/// skipped; the rest of the scan proceeds.
fn open_feedback(rows: Vec<guestloop_db::Feedback>) -> Vec<Feedback> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            let tenant_id = row.tenant_id;
            match Feedback::try_from(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(
                        target: "sla_monitor",
                        feedback_id = %id,
                        tenant_id = %tenant_id,
                        error = %e,
                        "Skipping unreadable feedback row"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Feedback rows in the `feedback` table.
#[derive(Clone)]
pub struct PgFeedbackStore {
    pool: PgPool,
}

impl PgFeedbackStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FeedbackStore for PgFeedbackStore {
    async fn get(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>> {
        guestloop_db::Feedback::find_by_id(&self.pool, tenant_id.into_inner(), id.into_inner())
            .await?
            .map(Feedback::try_from)
            .transpose()
    }

    async fn list_open(&self, tenant_ids: &[TenantId]) -> Result<Vec<Feedback>> {
        let ids: Vec<Uuid> = tenant_ids.iter().map(|t| t.into_inner()).collect();
        let rows = guestloop_db::Feedback::list_open(&self.pool, &ids).await?;
        Ok(open_feedback(rows))
    }

    async fn raise_escalation(
        &self,
        tenant_id: TenantId,
        id: FeedbackId,
        level: i32,
    ) -> Result<Option<Feedback>> {
        guestloop_db::Feedback::raise_escalation(
            &self.pool,
            tenant_id.into_inner(),
            id.into_inner(),
            level,
        )
        .await?
        .map(Feedback::try_from)
        .transpose()
    }

    async fn acknowledge(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>> {
        guestloop_db::Feedback::acknowledge(&self.pool, tenant_id.into_inner(), id.into_inner())
            .await?
            .map(Feedback::try_from)
            .transpose()
    }

    async fn resolve(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>> {
        guestloop_db::Feedback::resolve(&self.pool, tenant_id.into_inner(), id.into_inner())
            .await?
            .map(Feedback::try_from)
            .transpose()
    }
}

/// Category routing joined with manager contacts.
#[derive(Clone)]
pub struct PgHierarchyStore {
    pool: PgPool,
}

impl PgHierarchyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl HierarchyStore for PgHierarchyStore {
    async fn find_for_category(
        &self,
        tenant_id: TenantId,
        category: &str,
    ) -> Result<Option<TenantHierarchy>> {
        let Some(route) = CategoryRoutingConfiguration::find_for_category(
            &self.pool,
            tenant_id.into_inner(),
            category,
        )
        .await?
        else {
            return Ok(None);
        };

        let managers = ManagerConfiguration::find_active_by_ids(
            &self.pool,
            tenant_id.into_inner(),
            &route.manager_ids(),
        )
        .await?;

        let pick = |id: Option<Uuid>| -> Option<ManagerContact> {
            let id = id?;
            let found = managers.iter().find(|m| m.id == id).cloned();
            if found.is_none() {
                warn!(
                    target: "escalation",
                    tenant_id = %tenant_id,
                    manager_id = %id,
                    category,
                    "Routed manager is missing or inactive"
                );
            }
            found.map(ManagerContact::from)
        };

        Ok(Some(TenantHierarchy {
            escalation_hours: route.escalation_hours,
            primary: pick(route.primary_manager_id),
            backup: pick(route.backup_manager_id),
            general_manager: pick(route.general_manager_id),
        }))
    }
}

/// Append-only rows in `escalation_logs`.
#[derive(Clone)]
pub struct PgEscalationLogStore {
    pool: PgPool,
}

impl PgEscalationLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EscalationLogStore for PgEscalationLogStore {
    async fn record(
        &self,
        tenant_id: TenantId,
        input: NewEscalationRecord,
    ) -> Result<EscalationRecord> {
        let row = EscalationLog::create(
            &self.pool,
            tenant_id.into_inner(),
            CreateEscalationLog {
                feedback_id: input.feedback_id.into_inner(),
                escalation_level: input.escalation_level,
                from_manager_id: input.from_manager_id.map(|m| m.into_inner()),
                to_manager_id: input.to_manager.id.map(|m| m.into_inner()),
                to_manager_email: input.to_manager.email,
                to_manager_name: input.to_manager.name,
                reason: input.reason,
            },
        )
        .await?;
        Ok(row.into())
    }

    async fn list_for_feedback(
        &self,
        tenant_id: TenantId,
        feedback_id: FeedbackId,
    ) -> Result<Vec<EscalationRecord>> {
        let rows = EscalationLog::find_by_feedback(
            &self.pool,
            tenant_id.into_inner(),
            feedback_id.into_inner(),
        )
        .await?;
        Ok(rows.into_iter().map(EscalationRecord::from).collect())
    }
}

/// Rows in `response_approvals`.
#[derive(Clone)]
pub struct PgApprovalStore {
    pool: PgPool,
}

impl PgApprovalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ApprovalStore for PgApprovalStore {
    async fn create(
        &self,
        tenant_id: TenantId,
        input: NewResponseApproval,
    ) -> Result<ResponseApproval> {
        let row = guestloop_db::ResponseApproval::create(
            &self.pool,
            tenant_id.into_inner(),
            CreateResponseApproval {
                feedback_id: input.feedback_id.map(|f| f.into_inner()),
                response_text: input.response_text,
                recipient_email: input.recipient_email,
                subject: input.subject,
                severity_level: input.severity_level,
                risk_factors: input.risk_factors,
                expires_at: input.expires_at,
            },
        )
        .await?;
        ResponseApproval::try_from(row)
    }

    async fn get(&self, tenant_id: TenantId, id: ApprovalId) -> Result<Option<ResponseApproval>> {
        guestloop_db::ResponseApproval::find_by_id(&self.pool, tenant_id.into_inner(), id.into_inner())
            .await?
            .map(ResponseApproval::try_from)
            .transpose()
    }

    async fn decide(
        &self,
        tenant_id: TenantId,
        id: ApprovalId,
        status: ApprovalStatus,
        decided_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<ResponseApproval>> {
        guestloop_db::ResponseApproval::decide(
            &self.pool,
            tenant_id.into_inner(),
            id.into_inner(),
            status,
            decided_by,
            reason,
        )
        .await?
        .map(ResponseApproval::try_from)
        .transpose()
    }

    async fn mark_expired(&self, tenant_id: TenantId, id: ApprovalId) -> Result<bool> {
        Ok(guestloop_db::ResponseApproval::mark_expired(
            &self.pool,
            tenant_id.into_inner(),
            id.into_inner(),
        )
        .await?)
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64> {
        Ok(guestloop_db::ResponseApproval::expire_pending(&self.pool, now).await?)
    }

    async fn mark_notification_sent(&self, tenant_id: TenantId, id: ApprovalId) -> Result<bool> {
        Ok(guestloop_db::ResponseApproval::mark_notification_sent(
            &self.pool,
            tenant_id.into_inner(),
            id.into_inner(),
        )
        .await?)
    }

    async fn claim_for_send(
        &self,
        tenant_id: TenantId,
        id: ApprovalId,
    ) -> Result<Option<ResponseApproval>> {
        guestloop_db::ResponseApproval::claim_for_send(
            &self.pool,
            tenant_id.into_inner(),
            id.into_inner(),
        )
        .await?
        .map(ResponseApproval::try_from)
        .transpose()
    }
}

/// Rows in `email_queue`.
#[derive(Clone)]
pub struct PgEmailQueueStore {
    pool: PgPool,
}

impl PgEmailQueueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EmailQueueStore for PgEmailQueueStore {
    async fn enqueue(&self, input: NewQueuedEmail) -> Result<QueuedEmail> {
        let row = EmailQueueEntry::create(
            &self.pool,
            CreateEmailQueueEntry {
                tenant_id: input.tenant_id.map(|t| t.into_inner()),
                from_address: input.message.from,
                to_addresses: input.message.to,
                cc_addresses: input.message.cc,
                subject: input.message.subject,
                html: input.message.html,
                max_attempts: input.max_attempts,
                scheduled_for: input.scheduled_for,
            },
        )
        .await?;
        QueuedEmail::try_from(row)
    }

    async fn next_due(&self, now: DateTime<Utc>) -> Result<Option<QueuedEmail>> {
        EmailQueueEntry::next_due(&self.pool, now)
            .await?
            .map(QueuedEmail::try_from)
            .transpose()
    }

    async fn mark_sent(
        &self,
        id: EmailQueueId,
        attempts: i32,
        sent_at: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(EmailQueueEntry::mark_sent(&self.pool, id.into_inner(), attempts, sent_at).await?)
    }

    async fn reschedule(
        &self,
        id: EmailQueueId,
        attempts: i32,
        scheduled_for: DateTime<Utc>,
        last_error: &str,
    ) -> Result<bool> {
        Ok(EmailQueueEntry::reschedule(
            &self.pool,
            id.into_inner(),
            attempts,
            scheduled_for,
            last_error,
        )
        .await?)
    }

    async fn mark_failed(&self, id: EmailQueueId, attempts: i32, last_error: &str) -> Result<bool> {
        Ok(EmailQueueEntry::mark_failed(&self.pool, id.into_inner(), attempts, last_error).await?)
    }
}

/// Rows in `audit_logs`.
#[derive(Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuditStore for PgAuditStore {
    async fn log(&self, input: AuditEntryInput) -> Result<AuditEntry> {
        let row = AuditLog::create(
            &self.pool,
            CreateAuditLog {
                tenant_id: input.tenant_id.map(TenantId::into_inner),
                action: input.action.as_str().to_string(),
                details: input.details,
            },
        )
        .await?;

        Ok(AuditEntry {
            id: AuditLogId::from_uuid(row.id),
            tenant_id: row.tenant_id.map(TenantId::from_uuid),
            action: input.action,
            details: row.details,
            created_at: row.created_at,
        })
    }
}
