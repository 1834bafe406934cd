//! Per-category routing: SLA window and manager hierarchy.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Routing row for one `(tenant, issue_category)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryRoutingConfiguration {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub issue_category: String,
    pub escalation_hours: Option<f64>,
    pub primary_manager_id: Option<Uuid>,
    pub backup_manager_id: Option<Uuid>,
    pub general_manager_id: Option<Uuid>,
}

impl CategoryRoutingConfiguration {
    /// Find the routing row for a category.
    pub async fn find_for_category(
        pool: &PgPool,
        tenant_id: Uuid,
        issue_category: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, tenant_id, issue_category, escalation_hours,
                   primary_manager_id, backup_manager_id, general_manager_id
            FROM category_routing_configurations
            WHERE tenant_id = $1 AND lower(issue_category) = lower($2)
            LIMIT 1
            ",
        )
        .bind(tenant_id)
        .bind(issue_category)
        .fetch_optional(pool)
        .await
    }

    /// IDs of every manager referenced by this row.
    #[must_use]
    pub fn manager_ids(&self) -> Vec<Uuid> {
        [
            self.primary_manager_id,
            self.backup_manager_id,
            self.general_manager_id,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
