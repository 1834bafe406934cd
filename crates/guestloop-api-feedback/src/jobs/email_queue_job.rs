//! Email Queue Job.
//!
//! Drains due entries from the email retry queue.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use guestloop_feedback::{EmailQueueProcessor, EmailQueueStats, FeedbackError};

/// Default polling interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default number of entries attempted per poll.
pub const DEFAULT_BATCH_SIZE: usize = 50;

pub struct EmailQueueJob {
    processor: Arc<EmailQueueProcessor>,
    batch_size: usize,
}

/// Errors that can occur while draining the queue.
#[derive(Debug, thiserror::Error)]
pub enum EmailQueueJobError {
    #[error("Service error: {0}")]
    Service(#[from] FeedbackError),
}

impl EmailQueueJob {
    #[must_use]
    pub fn new(processor: Arc<EmailQueueProcessor>) -> Self {
        Self {
            processor,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Create with custom batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Run a single poll cycle.
    #[instrument(skip(self))]
    pub async fn poll(&self) -> Result<EmailQueueStats, EmailQueueJobError> {
        Ok(self.processor.process_due(Utc::now(), self.batch_size).await?)
    }
}
