//! Escalation log model.
//!
//! Append-only audit trail of escalation hand-offs. Rows are never updated
//! or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// One escalation hand-off.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EscalationLog {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub feedback_id: Uuid,
    pub escalation_level: i32,
    pub from_manager_id: Option<Uuid>,
    pub to_manager_id: Option<Uuid>,
    pub to_manager_email: String,
    pub to_manager_name: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording an escalation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEscalationLog {
    pub feedback_id: Uuid,
    pub escalation_level: i32,
    pub from_manager_id: Option<Uuid>,
    pub to_manager_id: Option<Uuid>,
    pub to_manager_email: String,
    pub to_manager_name: String,
    pub reason: String,
}

impl EscalationLog {
    /// Insert a new escalation log row.
    pub async fn create(
        pool: &PgPool,
        tenant_id: Uuid,
        input: CreateEscalationLog,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO escalation_logs (
                tenant_id, feedback_id, escalation_level, from_manager_id,
                to_manager_id, to_manager_email, to_manager_name, reason
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, tenant_id, feedback_id, escalation_level, from_manager_id,
                      to_manager_id, to_manager_email, to_manager_name, reason, created_at
            ",
        )
        .bind(tenant_id)
        .bind(input.feedback_id)
        .bind(input.escalation_level)
        .bind(input.from_manager_id)
        .bind(input.to_manager_id)
        .bind(&input.to_manager_email)
        .bind(&input.to_manager_name)
        .bind(&input.reason)
        .fetch_one(pool)
        .await
    }

    /// All escalations for a feedback item, oldest first.
    pub async fn find_by_feedback(
        pool: &PgPool,
        tenant_id: Uuid,
        feedback_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, tenant_id, feedback_id, escalation_level, from_manager_id,
                   to_manager_id, to_manager_email, to_manager_name, reason, created_at
            FROM escalation_logs
            WHERE tenant_id = $1 AND feedback_id = $2
            ORDER BY created_at ASC
            ",
        )
        .bind(tenant_id)
        .bind(feedback_id)
        .fetch_all(pool)
        .await
    }
}
