//! Audit logging for feedback operations.
//!
//! Audit writes are always best-effort: callers log a failed write and carry
//! on rather than undoing the operation being audited.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use guestloop_core::{AuditLogId, TenantId};

use crate::error::{FeedbackError, Result};

/// Audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Summary of one SLA monitor pass.
    SlaComplianceCheck,
    /// A flagged response was parked for human review.
    ResponseApprovalRequested,
    /// A reviewer approved or rejected a response.
    ResponseApprovalDecided,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlaComplianceCheck => "sla_compliance_check",
            Self::ResponseApprovalRequested => "response_approval_requested",
            Self::ResponseApprovalDecided => "response_approval_decided",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditLogId,
    /// None for runs spanning every tenant.
    pub tenant_id: Option<TenantId>,
    pub action: AuditAction,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an audit entry.
#[derive(Debug, Clone)]
pub struct AuditEntryInput {
    pub tenant_id: Option<TenantId>,
    pub action: AuditAction,
    pub details: serde_json::Value,
}

/// Trait for audit storage backends.
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    async fn log(&self, input: AuditEntryInput) -> Result<AuditEntry>;
}

/// In-memory audit store for testing.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    entries: Arc<RwLock<HashMap<AuditLogId, AuditEntry>>>,
    fail_writes: AtomicBool,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Entries with the given action, oldest first.
    pub async fn entries_for(&self, action: AuditAction) -> Vec<AuditEntry> {
        let mut entries: Vec<AuditEntry> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.action == action)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.created_at);
        entries
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait::async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn log(&self, input: AuditEntryInput) -> Result<AuditEntry> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FeedbackError::Store("audit store unavailable".to_string()));
        }

        let entry = AuditEntry {
            id: AuditLogId::new(),
            tenant_id: input.tenant_id,
            action: input.action,
            details: input.details,
            created_at: Utc::now(),
        };
        self.entries.write().await.insert(entry.id, entry.clone());
        Ok(entry)
    }
}
