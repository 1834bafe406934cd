//! API error types for feedback endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use guestloop_feedback::FeedbackError;

/// API error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for client handling.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Feedback API error type.
#[derive(Debug, Error)]
pub enum ApiFeedbackError {
    /// Domain error from the feedback crate.
    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or malformed `X-Tenant-ID` header.
    #[error("Tenant required: {0}")]
    TenantRequired(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiFeedbackError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Self::Feedback(e) => {
                if e.is_not_found() {
                    (StatusCode::NOT_FOUND, "not_found", e.to_string())
                } else if e.is_conflict() {
                    (StatusCode::CONFLICT, "conflict", e.to_string())
                } else {
                    match e {
                        FeedbackError::Validation(msg) => {
                            (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
                        }
                        FeedbackError::ExternalService(msg) => {
                            (StatusCode::BAD_GATEWAY, "external_service_failure", msg.clone())
                        }
                        FeedbackError::RiskGate(msg) => (
                            StatusCode::SERVICE_UNAVAILABLE,
                            "risk_gate_failure",
                            msg.clone(),
                        ),
                        FeedbackError::Database(db_err) => {
                            tracing::error!("FeedbackError::Database: {:?}", db_err);
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                "database_error",
                                "Database error".to_string(),
                            )
                        }
                        _ => {
                            tracing::error!("Unhandled feedback error: {:?}", e);
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                "internal_error",
                                "An internal error occurred".to_string(),
                            )
                        }
                    }
                }
            }
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Self::TenantRequired(msg) => (StatusCode::BAD_REQUEST, "tenant_required", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiFeedbackError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiFeedbackError>;
