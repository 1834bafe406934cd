//! Guest feedback model.
//!
//! Rows are created by the guest-facing form. This subsystem only moves
//! status forward and stamps `acknowledged_at` / `resolved_at` once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Feedback workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Pending,
    Acknowledged,
    InProgress,
    Escalated,
    Resolved,
}

impl std::str::FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "acknowledged" => Ok(Self::Acknowledged),
            "in_progress" => Ok(Self::InProgress),
            "escalated" => Ok(Self::Escalated),
            "resolved" => Ok(Self::Resolved),
            _ => Err(format!("Unknown feedback status: {s}")),
        }
    }
}

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FeedbackStatus {
    /// Convert to database string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
            Self::InProgress => "in_progress",
            Self::Escalated => "escalated",
            Self::Resolved => "resolved",
        }
    }

    /// Check if this is a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// Feedback row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub issue_category: Option<String>,
    pub room_number: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub status: String,
    pub escalation_level: i32,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

const FEEDBACK_COLUMNS: &str = "id, tenant_id, rating, comment, issue_category, room_number, \
     guest_name, guest_email, status, escalation_level, created_at, acknowledged_at, \
     resolved_at, updated_at";

impl Feedback {
    /// Get status as enum.
    pub fn status_enum(&self) -> Result<FeedbackStatus, String> {
        self.status.parse()
    }

    /// Find a feedback item by ID within a tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE tenant_id = $1 AND id = $2"
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List unresolved feedback, oldest first.
    ///
    /// An empty `tenant_ids` slice means every tenant.
    pub async fn list_open(pool: &PgPool, tenant_ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r"
            SELECT {FEEDBACK_COLUMNS}
            FROM feedback
            WHERE status <> 'resolved'
              AND resolved_at IS NULL
              AND (cardinality($1::uuid[]) = 0 OR tenant_id = ANY($1))
            ORDER BY created_at ASC
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_ids)
            .fetch_all(pool)
            .await
    }

    /// Raise the escalation level and mark the item escalated.
    ///
    /// Returns None when the row is missing, resolved, or already at or
    /// above `level`; the level never decreases.
    pub async fn raise_escalation(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        level: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r"
            UPDATE feedback
            SET status = 'escalated',
                escalation_level = GREATEST(escalation_level, $3),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
              AND resolved_at IS NULL
              AND escalation_level < $3
            RETURNING {FEEDBACK_COLUMNS}
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(level)
            .fetch_optional(pool)
            .await
    }

    /// Record manager acknowledgment. The timestamp is only set once.
    pub async fn acknowledge(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r"
            UPDATE feedback
            SET acknowledged_at = COALESCE(acknowledged_at, NOW()),
                status = CASE WHEN status = 'pending' THEN 'acknowledged' ELSE status END,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {FEEDBACK_COLUMNS}
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark the item resolved. The timestamp is only set once.
    pub async fn resolve(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r"
            UPDATE feedback
            SET resolved_at = COALESCE(resolved_at, NOW()),
                status = 'resolved',
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {FEEDBACK_COLUMNS}
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
