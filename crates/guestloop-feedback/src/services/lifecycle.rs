//! Manager actions on a feedback item.

use std::sync::Arc;

use tracing::{info, instrument};

use guestloop_core::{FeedbackId, TenantId};

use crate::error::{FeedbackError, Result};
use crate::store::FeedbackStore;
use crate::types::Feedback;

/// Acknowledge and resolve feedback.
///
/// Both timestamps are set at most once. Acknowledging stops reminders;
/// resolving stops every further SLA action.
pub struct FeedbackLifecycleService {
    feedback: Arc<dyn FeedbackStore>,
}

impl FeedbackLifecycleService {
    pub fn new(feedback: Arc<dyn FeedbackStore>) -> Self {
        Self { feedback }
    }

    pub async fn get(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Feedback> {
        self.feedback
            .get(tenant_id, id)
            .await?
            .ok_or(FeedbackError::FeedbackNotFound(id.into_inner()))
    }

    #[instrument(skip(self))]
    pub async fn acknowledge(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Feedback> {
        let item = self
            .feedback
            .acknowledge(tenant_id, id)
            .await?
            .ok_or(FeedbackError::FeedbackNotFound(id.into_inner()))?;
        info!(target: "feedback", status = %item.status, "Feedback acknowledged");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, tenant_id: TenantId, id: FeedbackId) -> Result<Feedback> {
        let item = self
            .feedback
            .resolve(tenant_id, id)
            .await?
            .ok_or(FeedbackError::FeedbackNotFound(id.into_inner()))?;
        info!(target: "feedback", "Feedback resolved");
        Ok(item)
    }
}
