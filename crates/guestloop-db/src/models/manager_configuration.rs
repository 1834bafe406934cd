//! Manager contact configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A manager who can receive reminders and escalations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManagerConfiguration {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ManagerConfiguration {
    /// Load active managers by ID within a tenant.
    pub async fn find_active_by_ids(
        pool: &PgPool,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Self>(
            r"
            SELECT id, tenant_id, name, email, department, is_active, created_at
            FROM manager_configurations
            WHERE tenant_id = $1 AND id = ANY($2) AND is_active = true
            ",
        )
        .bind(tenant_id)
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
