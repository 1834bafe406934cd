//! Email retry queue.
//!
//! Mail that could not be delivered inline is parked here and retried with
//! exponential backoff until it is sent or runs out of attempts. Entries are
//! processed one at a time, oldest due first.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use guestloop_core::{EmailQueueId, TenantId};

use crate::config::EmailQueueConfig;
use crate::email::{EmailMessage, Mailer};
use crate::error::Result;
use crate::store::EmailQueueStore;
use crate::types::{NewQueuedEmail, QueuedEmail};

/// Delay before the next attempt after `attempts` failures.
///
/// `base * 2^(attempts - 1)`, capped at `max`.
#[must_use]
pub fn backoff_delay(config: &EmailQueueConfig, attempts: i32) -> Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 30) as u32;
    let secs = config
        .base_backoff_secs
        .saturating_mul(1_i64 << exponent)
        .min(config.max_backoff_secs);
    Duration::seconds(secs.max(0))
}

/// What happened to one queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "delivery", rename_all = "snake_case")]
pub enum QueueDelivery {
    Sent {
        id: EmailQueueId,
        attempts: i32,
    },
    Retrying {
        id: EmailQueueId,
        attempts: i32,
        next_attempt_at: DateTime<Utc>,
    },
    Failed {
        id: EmailQueueId,
        attempts: i32,
    },
}

/// Counts from draining the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailQueueStats {
    pub processed: usize,
    pub sent: usize,
    pub retrying: usize,
    pub failed: usize,
}

impl EmailQueueStats {
    pub fn record(&mut self, delivery: &QueueDelivery) {
        self.processed += 1;
        match delivery {
            QueueDelivery::Sent { .. } => self.sent += 1,
            QueueDelivery::Retrying { .. } => self.retrying += 1,
            QueueDelivery::Failed { .. } => self.failed += 1,
        }
    }
}

pub struct EmailQueueProcessor {
    store: Arc<dyn EmailQueueStore>,
    mailer: Arc<dyn Mailer>,
    config: EmailQueueConfig,
}

impl EmailQueueProcessor {
    pub fn new(
        store: Arc<dyn EmailQueueStore>,
        mailer: Arc<dyn Mailer>,
        config: EmailQueueConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    /// Park a message for delivery on the next pass.
    pub async fn enqueue(
        &self,
        tenant_id: Option<TenantId>,
        message: EmailMessage,
        now: DateTime<Utc>,
    ) -> Result<QueuedEmail> {
        let entry = self
            .store
            .enqueue(NewQueuedEmail {
                tenant_id,
                message,
                max_attempts: self.config.max_attempts,
                scheduled_for: now,
            })
            .await?;
        debug!(target: "email_queue", id = %entry.id, "Email queued");
        Ok(entry)
    }

    /// Attempt the oldest due entry. None when nothing is due.
    #[instrument(skip(self))]
    pub async fn process_next(&self, now: DateTime<Utc>) -> Result<Option<QueueDelivery>> {
        let Some(entry) = self.store.next_due(now).await? else {
            return Ok(None);
        };
        let attempts = entry.attempts + 1;

        let error = match self.mailer.send(&entry.message).await {
            Ok(()) => {
                self.store.mark_sent(entry.id, attempts, now).await?;
                debug!(target: "email_queue", id = %entry.id, attempts, "Queued email sent");
                return Ok(Some(QueueDelivery::Sent {
                    id: entry.id,
                    attempts,
                }));
            }
            Err(e) => e.to_string(),
        };

        if attempts >= entry.max_attempts {
            self.store.mark_failed(entry.id, attempts, &error).await?;
            warn!(
                target: "email_queue",
                id = %entry.id,
                attempts,
                error = %error,
                "Queued email failed permanently"
            );
            return Ok(Some(QueueDelivery::Failed {
                id: entry.id,
                attempts,
            }));
        }

        let next_attempt_at = now + backoff_delay(&self.config, attempts);
        self.store
            .reschedule(entry.id, attempts, next_attempt_at, &error)
            .await?;
        debug!(
            target: "email_queue",
            id = %entry.id,
            attempts,
            next_attempt_at = %next_attempt_at,
            "Queued email rescheduled"
        );
        Ok(Some(QueueDelivery::Retrying {
            id: entry.id,
            attempts,
            next_attempt_at,
        }))
    }

    /// Process up to `max` due entries.
    #[instrument(skip(self))]
    pub async fn process_due(&self, now: DateTime<Utc>, max: usize) -> Result<EmailQueueStats> {
        let mut stats = EmailQueueStats::default();
        while stats.processed < max {
            match self.process_next(now).await? {
                Some(delivery) => stats.record(&delivery),
                None => break,
            }
        }

        if stats.processed > 0 {
            info!(
                target: "email_queue",
                processed = stats.processed,
                sent = stats.sent,
                retrying = stats.retrying,
                failed = stats.failed,
                "Email queue pass complete"
            );
        }
        Ok(stats)
    }
}
