//! In-memory stores for testing.
//!
//! Each store can be told to fail so tests can exercise the error paths the
//! services promise to survive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use guestloop_core::{ApprovalId, EmailQueueId, EscalationLogId, FeedbackId, TenantId};

use super::{ApprovalStore, EmailQueueStore, EscalationLogStore, FeedbackStore, HierarchyStore};
use crate::error::{FeedbackError, Result};
use crate::types::{
    ApprovalStatus, EmailQueueStatus, EscalationRecord, Feedback, FeedbackStatus,
    NewEscalationRecord, NewQueuedEmail, NewResponseApproval, QueuedEmail, ResponseApproval,
    TenantHierarchy,
};

fn unavailable(store: &str) -> FeedbackError {
    FeedbackError::Store(format!("{store} unavailable"))
}

// ============================================================================
// Feedback
// ============================================================================

/// In-memory feedback store for testing.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    items: Arc<RwLock<HashMap<FeedbackId, Feedback>>>,
    fail_scans: AtomicBool,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item.
    pub async fn insert(&self, item: Feedback) {
        self.items.write().await.insert(item.id, item);
    }

    /// Current state of an item regardless of tenant.
    pub async fn snapshot(&self, id: FeedbackId) -> Option<Feedback> {
        self.items.read().await.get(&id).cloned()
    }

    /// Make `list_open` fail until reset.
    pub fn set_fail_scans(&self, fail: bool) {
        self.fail_scans.store(fail, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.items.read().await.len()
    }
}

#[async_trait::async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn get(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>> {
        let items = self.items.read().await;
        Ok(items.get(&id).filter(|f| f.tenant_id == tenant_id).cloned())
    }

    async fn list_open(&self, tenant_ids: &[TenantId]) -> Result<Vec<Feedback>> {
        if self.fail_scans.load(Ordering::SeqCst) {
            return Err(unavailable("feedback store"));
        }

        let items = self.items.read().await;
        let mut open: Vec<Feedback> = items
            .values()
            .filter(|f| !f.is_resolved())
            .filter(|f| tenant_ids.is_empty() || tenant_ids.contains(&f.tenant_id))
            .cloned()
            .collect();
        open.sort_by_key(|f| f.created_at);
        Ok(open)
    }

    async fn raise_escalation(
        &self,
        tenant_id: TenantId,
        id: FeedbackId,
        level: i32,
    ) -> Result<Option<Feedback>> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(&id).filter(|f| f.tenant_id == tenant_id) else {
            return Ok(None);
        };
        if item.is_resolved() || item.escalation_level >= level {
            return Ok(None);
        }

        item.escalation_level = level;
        item.status = FeedbackStatus::Escalated;
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn acknowledge(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(&id).filter(|f| f.tenant_id == tenant_id) else {
            return Ok(None);
        };

        let now = Utc::now();
        item.acknowledged_at.get_or_insert(now);
        if item.status == FeedbackStatus::Pending {
            item.status = FeedbackStatus::Acknowledged;
        }
        item.updated_at = now;
        Ok(Some(item.clone()))
    }

    async fn resolve(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Option<Feedback>> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(&id).filter(|f| f.tenant_id == tenant_id) else {
            return Ok(None);
        };

        let now = Utc::now();
        item.resolved_at.get_or_insert(now);
        item.status = FeedbackStatus::Resolved;
        item.updated_at = now;
        Ok(Some(item.clone()))
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

/// In-memory category routing for testing.
#[derive(Debug, Default)]
pub struct InMemoryHierarchyStore {
    routes: Arc<RwLock<HashMap<(TenantId, String), TenantHierarchy>>>,
    fail_lookups: AtomicBool,
}

impl InMemoryHierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure routing for a category. Matching is case-insensitive.
    pub async fn set_category(
        &self,
        tenant_id: TenantId,
        category: &str,
        hierarchy: TenantHierarchy,
    ) {
        self.routes
            .write()
            .await
            .insert((tenant_id, category.to_lowercase()), hierarchy);
    }

    pub fn set_fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl HierarchyStore for InMemoryHierarchyStore {
    async fn find_for_category(
        &self,
        tenant_id: TenantId,
        category: &str,
    ) -> Result<Option<TenantHierarchy>> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(unavailable("hierarchy store"));
        }
        let routes = self.routes.read().await;
        Ok(routes.get(&(tenant_id, category.to_lowercase())).cloned())
    }
}

// ============================================================================
// Escalation log
// ============================================================================

/// In-memory escalation log for testing.
#[derive(Debug, Default)]
pub struct InMemoryEscalationLogStore {
    records: Arc<RwLock<Vec<EscalationRecord>>>,
    fail_writes: AtomicBool,
}

impl InMemoryEscalationLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn all(&self) -> Vec<EscalationRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait::async_trait]
impl EscalationLogStore for InMemoryEscalationLogStore {
    async fn record(
        &self,
        tenant_id: TenantId,
        input: NewEscalationRecord,
    ) -> Result<EscalationRecord> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable("escalation log"));
        }

        let record = EscalationRecord {
            id: EscalationLogId::new(),
            tenant_id,
            feedback_id: input.feedback_id,
            escalation_level: input.escalation_level,
            from_manager_id: input.from_manager_id,
            to_manager_id: input.to_manager.id,
            to_manager_email: input.to_manager.email,
            to_manager_name: input.to_manager.name,
            reason: input.reason,
            created_at: Utc::now(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_for_feedback(
        &self,
        tenant_id: TenantId,
        feedback_id: FeedbackId,
    ) -> Result<Vec<EscalationRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.feedback_id == feedback_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Approvals
// ============================================================================

/// In-memory approval store for testing.
#[derive(Debug, Default)]
pub struct InMemoryApprovalStore {
    approvals: Arc<RwLock<HashMap<ApprovalId, ResponseApproval>>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create` fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `get` and `claim_for_send` fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Current state of a request regardless of tenant.
    pub async fn snapshot(&self, id: ApprovalId) -> Option<ResponseApproval> {
        self.approvals.read().await.get(&id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.approvals.read().await.len()
    }
}

#[async_trait::async_trait]
impl ApprovalStore for InMemoryApprovalStore {
    async fn create(
        &self,
        tenant_id: TenantId,
        input: NewResponseApproval,
    ) -> Result<ResponseApproval> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable("approval store"));
        }

        let approval = ResponseApproval {
            id: ApprovalId::new(),
            tenant_id,
            feedback_id: input.feedback_id,
            response_text: input.response_text,
            recipient_email: input.recipient_email,
            subject: input.subject,
            severity_level: input.severity_level,
            risk_factors: input.risk_factors,
            status: ApprovalStatus::Pending,
            requested_at: Utc::now(),
            expires_at: input.expires_at,
            decided_by: None,
            decided_at: None,
            decision_reason: None,
            notification_sent: false,
            sent_at: None,
        };
        self.approvals
            .write()
            .await
            .insert(approval.id, approval.clone());
        Ok(approval)
    }

    async fn get(&self, tenant_id: TenantId, id: ApprovalId) -> Result<Option<ResponseApproval>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("approval store"));
        }
        let approvals = self.approvals.read().await;
        Ok(approvals
            .get(&id)
            .filter(|a| a.tenant_id == tenant_id)
            .cloned())
    }

    async fn decide(
        &self,
        tenant_id: TenantId,
        id: ApprovalId,
        status: ApprovalStatus,
        decided_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<ResponseApproval>> {
        let now = Utc::now();
        let mut approvals = self.approvals.write().await;
        let Some(approval) = approvals.get_mut(&id).filter(|a| a.tenant_id == tenant_id) else {
            return Ok(None);
        };
        if approval.status != ApprovalStatus::Pending || approval.expires_at <= now {
            return Ok(None);
        }

        approval.status = status;
        approval.decided_by = Some(decided_by);
        approval.decided_at = Some(now);
        approval.decision_reason = reason;
        Ok(Some(approval.clone()))
    }

    async fn mark_expired(&self, tenant_id: TenantId, id: ApprovalId) -> Result<bool> {
        let mut approvals = self.approvals.write().await;
        match approvals.get_mut(&id) {
            Some(a) if a.tenant_id == tenant_id && a.status == ApprovalStatus::Pending => {
                a.status = ApprovalStatus::Expired;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut approvals = self.approvals.write().await;
        let mut count = 0u64;
        for approval in approvals.values_mut() {
            if approval.status == ApprovalStatus::Pending && approval.expires_at <= now {
                approval.status = ApprovalStatus::Expired;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn mark_notification_sent(&self, tenant_id: TenantId, id: ApprovalId) -> Result<bool> {
        let mut approvals = self.approvals.write().await;
        match approvals.get_mut(&id) {
            Some(a) if a.tenant_id == tenant_id => {
                a.notification_sent = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn claim_for_send(
        &self,
        tenant_id: TenantId,
        id: ApprovalId,
    ) -> Result<Option<ResponseApproval>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("approval store"));
        }
        let mut approvals = self.approvals.write().await;
        match approvals.get_mut(&id) {
            Some(a)
                if a.tenant_id == tenant_id
                    && a.status == ApprovalStatus::Approved
                    && a.sent_at.is_none() =>
            {
                a.sent_at = Some(Utc::now());
                Ok(Some(a.clone()))
            }
            _ => Ok(None),
        }
    }
}

// ============================================================================
// Email queue
// ============================================================================

/// In-memory email queue for testing.
#[derive(Debug, Default)]
pub struct InMemoryEmailQueueStore {
    entries: Arc<RwLock<HashMap<EmailQueueId, QueuedEmail>>>,
}

impl InMemoryEmailQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: EmailQueueId) -> Option<QueuedEmail> {
        self.entries.read().await.get(&id).cloned()
    }

    pub async fn all(&self) -> Vec<QueuedEmail> {
        let mut entries: Vec<QueuedEmail> = self.entries.read().await.values().cloned().collect();
        entries.sort_by_key(|e| e.created_at);
        entries
    }
}

#[async_trait::async_trait]
impl EmailQueueStore for InMemoryEmailQueueStore {
    async fn enqueue(&self, input: NewQueuedEmail) -> Result<QueuedEmail> {
        let entry = QueuedEmail {
            id: EmailQueueId::new(),
            tenant_id: input.tenant_id,
            message: input.message,
            status: EmailQueueStatus::Queued,
            attempts: 0,
            max_attempts: input.max_attempts,
            scheduled_for: input.scheduled_for,
            last_error: None,
            created_at: Utc::now(),
            sent_at: None,
        };
        self.entries.write().await.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn next_due(&self, now: DateTime<Utc>) -> Result<Option<QueuedEmail>> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|e| e.status == EmailQueueStatus::Queued && e.scheduled_for <= now)
            .min_by_key(|e| (e.scheduled_for, e.created_at))
            .cloned())
    }

    async fn mark_sent(
        &self,
        id: EmailQueueId,
        attempts: i32,
        sent_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(e) if e.status == EmailQueueStatus::Queued => {
                e.status = EmailQueueStatus::Sent;
                e.attempts = attempts;
                e.sent_at = Some(sent_at);
                e.last_error = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reschedule(
        &self,
        id: EmailQueueId,
        attempts: i32,
        scheduled_for: DateTime<Utc>,
        last_error: &str,
    ) -> Result<bool> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(e) if e.status == EmailQueueStatus::Queued => {
                e.attempts = attempts;
                e.scheduled_for = scheduled_for;
                e.last_error = Some(last_error.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_failed(&self, id: EmailQueueId, attempts: i32, last_error: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(e) if e.status == EmailQueueStatus::Queued => {
                e.status = EmailQueueStatus::Failed;
                e.attempts = attempts;
                e.last_error = Some(last_error.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
