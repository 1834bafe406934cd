//! Error types for the feedback domain.

use thiserror::Error;
use uuid::Uuid;

/// Result type for feedback operations.
pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Errors raised by feedback services and stores.
///
/// A missing category mapping is not an error: the hierarchy resolver falls
/// back to the configured default contacts instead.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Feedback item does not exist in the tenant.
    #[error("Feedback not found: {0}")]
    FeedbackNotFound(Uuid),

    /// Approval request does not exist in the tenant.
    #[error("Approval request not found: {0}")]
    ApprovalNotFound(Uuid),

    /// Approval request was already decided or has expired.
    #[error("Approval request {0} is no longer pending")]
    ApprovalNotPending(Uuid),

    /// Input rejected before any side effect.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Email API or another outbound call failed.
    #[error("External service failure: {0}")]
    ExternalService(String),

    /// The risk gate could not create or read an approval record.
    #[error("Risk gate failure: {0}")]
    RiskGate(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data could not be interpreted, or an in-memory store refused a write.
    #[error("Store error: {0}")]
    Store(String),
}

impl FeedbackError {
    /// Check if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FeedbackNotFound(_) | Self::ApprovalNotFound(_))
    }

    /// Check if this is a conflict error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ApprovalNotPending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let id = Uuid::new_v4();
        assert!(FeedbackError::FeedbackNotFound(id).is_not_found());
        assert!(FeedbackError::ApprovalNotFound(id).is_not_found());
        assert!(!FeedbackError::ApprovalNotPending(id).is_not_found());
        assert!(FeedbackError::ApprovalNotPending(id).is_conflict());
    }

    #[test]
    fn test_display_includes_id() {
        let id = Uuid::nil();
        assert_eq!(
            FeedbackError::FeedbackNotFound(id).to_string(),
            "Feedback not found: 00000000-0000-0000-0000-000000000000"
        );
    }
}
