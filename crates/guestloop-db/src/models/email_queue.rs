//! Outbound email queue.
//!
//! Failed sends are parked here and retried one at a time. Backoff is
//! expressed through `scheduled_for`, not in-memory timers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Queue entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailQueueStatus {
    Queued,
    Sent,
    Failed,
}

impl std::str::FromStr for EmailQueueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown email queue status: {s}")),
        }
    }
}

impl EmailQueueStatus {
    /// Convert to database string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

/// Queue row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailQueueEntry {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub cc_addresses: Vec<String>,
    pub subject: String,
    pub html: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub scheduled_for: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Input for enqueueing an email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmailQueueEntry {
    pub tenant_id: Option<Uuid>,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub cc_addresses: Vec<String>,
    pub subject: String,
    pub html: String,
    pub max_attempts: i32,
    pub scheduled_for: DateTime<Utc>,
}

const QUEUE_COLUMNS: &str = "id, tenant_id, from_address, to_addresses, cc_addresses, subject, \
     html, status, attempts, max_attempts, scheduled_for, last_error, created_at, sent_at";

impl EmailQueueEntry {
    /// Insert a queued email.
    pub async fn create(pool: &PgPool, input: CreateEmailQueueEntry) -> Result<Self, sqlx::Error> {
        let query = format!(
            r"
            INSERT INTO email_queue (
                tenant_id, from_address, to_addresses, cc_addresses, subject, html,
                status, attempts, max_attempts, scheduled_for
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'queued', 0, $7, $8)
            RETURNING {QUEUE_COLUMNS}
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(input.tenant_id)
            .bind(&input.from_address)
            .bind(&input.to_addresses)
            .bind(&input.cc_addresses)
            .bind(&input.subject)
            .bind(&input.html)
            .bind(input.max_attempts)
            .bind(input.scheduled_for)
            .fetch_one(pool)
            .await
    }

    /// Oldest queued entry that is due at `now`.
    pub async fn next_due(pool: &PgPool, now: DateTime<Utc>) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r"
            SELECT {QUEUE_COLUMNS}
            FROM email_queue
            WHERE status = 'queued' AND scheduled_for <= $1
            ORDER BY scheduled_for ASC, created_at ASC
            LIMIT 1
            "
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Mark an entry delivered.
    pub async fn mark_sent(
        pool: &PgPool,
        id: Uuid,
        attempts: i32,
        sent_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE email_queue
            SET status = 'sent', attempts = $2, sent_at = $3, last_error = NULL
            WHERE id = $1 AND status = 'queued'
            ",
        )
        .bind(id)
        .bind(attempts)
        .bind(sent_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Push an entry back for another attempt.
    pub async fn reschedule(
        pool: &PgPool,
        id: Uuid,
        attempts: i32,
        scheduled_for: DateTime<Utc>,
        last_error: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE email_queue
            SET attempts = $2, scheduled_for = $3, last_error = $4
            WHERE id = $1 AND status = 'queued'
            ",
        )
        .bind(id)
        .bind(attempts)
        .bind(scheduled_for)
        .bind(last_error)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Give up on an entry.
    pub async fn mark_failed(
        pool: &PgPool,
        id: Uuid,
        attempts: i32,
        last_error: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE email_queue
            SET status = 'failed', attempts = $2, last_error = $3
            WHERE id = $1 AND status = 'queued'
            ",
        )
        .bind(id)
        .bind(attempts)
        .bind(last_error)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
