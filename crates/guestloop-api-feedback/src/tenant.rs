//! Tenant extraction from request headers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HeaderMap, request::Parts},
};

use guestloop_core::TenantId;

use crate::error::ApiFeedbackError;

/// Header carrying the tenant for manager and approval routes.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// Tenant ID extracted from the `X-Tenant-ID` header.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub TenantId);

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiFeedbackError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_tenant_id(&parts.headers).map(TenantContext)
    }
}

fn extract_tenant_id(headers: &HeaderMap) -> Result<TenantId, ApiFeedbackError> {
    let raw = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiFeedbackError::TenantRequired("Missing X-Tenant-ID header".to_string()))?;

    raw.trim()
        .parse::<TenantId>()
        .map_err(|_| ApiFeedbackError::TenantRequired("Invalid X-Tenant-ID header".to_string()))
}
