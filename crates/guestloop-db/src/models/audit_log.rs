//! Audit log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Audit log row. `tenant_id` is empty for cross-tenant runs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Input for writing an audit row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLog {
    pub tenant_id: Option<Uuid>,
    pub action: String,
    pub details: serde_json::Value,
}

impl AuditLog {
    /// Insert an audit row.
    pub async fn create(pool: &PgPool, input: CreateAuditLog) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO audit_logs (tenant_id, action, details)
            VALUES ($1, $2, $3)
            RETURNING id, tenant_id, action, details, created_at
            ",
        )
        .bind(input.tenant_id)
        .bind(&input.action)
        .bind(&input.details)
        .fetch_one(pool)
        .await
    }
}
