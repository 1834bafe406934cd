//! Response approval model.
//!
//! Holds an AI-drafted guest response that the risk gate flagged. A human
//! reviewer moves it to approved or rejected; untouched rows expire. The
//! delayed sender consumes an approved row once by stamping `sent_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Approval status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting a human decision.
    Pending,
    /// Cleared for sending.
    Approved,
    /// Declined; never sent.
    Rejected,
    /// No decision before `expires_at`.
    Expired,
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "expired" => Ok(Self::Expired),
            _ => Err(format!("Unknown approval status: {s}")),
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApprovalStatus {
    /// Convert to database string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Check if this is a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Response approval row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResponseApproval {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub feedback_id: Option<Uuid>,
    pub response_text: String,
    pub recipient_email: String,
    pub subject: String,
    pub severity_level: String,
    pub risk_factors: Vec<String>,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_reason: Option<String>,
    pub notification_sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Input for creating an approval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponseApproval {
    pub feedback_id: Option<Uuid>,
    pub response_text: String,
    pub recipient_email: String,
    pub subject: String,
    pub severity_level: String,
    pub risk_factors: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

const APPROVAL_COLUMNS: &str = "id, tenant_id, feedback_id, response_text, recipient_email, \
     subject, severity_level, risk_factors, status, requested_at, expires_at, decided_by, \
     decided_at, decision_reason, notification_sent, sent_at";

impl ResponseApproval {
    /// Get status as enum.
    pub fn status_enum(&self) -> Result<ApprovalStatus, String> {
        self.status.parse()
    }

    /// Insert a pending approval request.
    pub async fn create(
        pool: &PgPool,
        tenant_id: Uuid,
        input: CreateResponseApproval,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            r"
            INSERT INTO response_approvals (
                tenant_id, feedback_id, response_text, recipient_email, subject,
                severity_level, risk_factors, status, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)
            RETURNING {APPROVAL_COLUMNS}
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_id)
            .bind(input.feedback_id)
            .bind(&input.response_text)
            .bind(&input.recipient_email)
            .bind(&input.subject)
            .bind(&input.severity_level)
            .bind(&input.risk_factors)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an approval request by ID within a tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query =
            format!("SELECT {APPROVAL_COLUMNS} FROM response_approvals WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record a human decision.
    ///
    /// Returns None if the request is missing, no longer pending, or past
    /// its expiry.
    pub async fn decide(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        status: ApprovalStatus,
        decided_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r"
            UPDATE response_approvals
            SET status = $3,
                decided_by = $4,
                decided_at = NOW(),
                decision_reason = $5
            WHERE tenant_id = $1 AND id = $2
              AND status = 'pending'
              AND expires_at > NOW()
            RETURNING {APPROVAL_COLUMNS}
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(status.as_str())
            .bind(decided_by)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    /// Mark a single pending request expired.
    pub async fn mark_expired(pool: &PgPool, tenant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE response_approvals
            SET status = 'expired'
            WHERE tenant_id = $1 AND id = $2 AND status = 'pending'
            ",
        )
        .bind(tenant_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Expire every pending request whose deadline is before `now`.
    pub async fn expire_pending(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE response_approvals
            SET status = 'expired'
            WHERE status = 'pending' AND expires_at <= $1
            ",
        )
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Mark the reviewer notification as sent.
    pub async fn mark_notification_sent(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE response_approvals
            SET notification_sent = true
            WHERE tenant_id = $1 AND id = $2
            ",
        )
        .bind(tenant_id)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Claim an approved request for sending.
    ///
    /// The status check and the `sent_at` stamp happen in one statement, so
    /// at most one caller gets a row back.
    pub async fn claim_for_send(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r"
            UPDATE response_approvals
            SET sent_at = NOW()
            WHERE tenant_id = $1 AND id = $2
              AND status = 'approved'
              AND sent_at IS NULL
            RETURNING {APPROVAL_COLUMNS}
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
