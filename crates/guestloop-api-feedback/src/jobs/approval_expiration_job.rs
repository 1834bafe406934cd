//! Approval Expiration Job.
//!
//! Marks pending reply approvals past their deadline as expired.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use guestloop_feedback::{ApprovalService, FeedbackError};

/// Default polling interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

pub struct ApprovalExpirationJob {
    approvals: Arc<ApprovalService>,
}

#[derive(Debug, Clone, Default)]
pub struct ApprovalExpirationStats {
    pub expired: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ApprovalExpirationJobError {
    #[error("Service error: {0}")]
    Service(#[from] FeedbackError),
}

impl ApprovalExpirationJob {
    #[must_use]
    pub fn new(approvals: Arc<ApprovalService>) -> Self {
        Self { approvals }
    }

    #[instrument(skip(self))]
    pub async fn poll(&self) -> Result<ApprovalExpirationStats, ApprovalExpirationJobError> {
        let expired = self.approvals.expire_pending(Utc::now()).await?;
        Ok(ApprovalExpirationStats { expired })
    }
}
