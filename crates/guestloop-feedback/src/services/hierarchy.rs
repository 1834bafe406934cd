//! Manager hierarchy resolution.
//!
//! Precedence: tenant category routing from the database, then the static
//! defaults in [`EscalationConfig`]. Resolution is per contact slot, so a
//! tenant that configured only a primary manager still gets the default
//! general manager.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use guestloop_core::TenantId;

use crate::config::EscalationConfig;
use crate::error::Result;
use crate::store::HierarchyStore;
use crate::types::{ManagerContact, TenantHierarchy};

/// Depth of the escalation chain: primary, backup, general manager.
pub const MAX_ESCALATION_LEVEL: i32 = 3;

/// Which rung of the hierarchy a contact sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTier {
    Primary,
    Backup,
    GeneralManager,
}

/// Where a resolved hierarchy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchySource {
    Tenant,
    Default,
}

/// Fully populated hierarchy for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedHierarchy {
    pub escalation_hours: f64,
    pub primary: ManagerContact,
    pub backup: Option<ManagerContact>,
    pub general_manager: ManagerContact,
    pub source: HierarchySource,
}

impl ResolvedHierarchy {
    /// Contact for an escalation level.
    ///
    /// Level 1 is the primary manager, level 2 the backup (or the general
    /// manager when there is no backup), anything higher the general manager.
    #[must_use]
    pub fn target_for_level(&self, level: i32) -> (EscalationTier, &ManagerContact) {
        match level {
            i32::MIN..=1 => (EscalationTier::Primary, &self.primary),
            2 => match &self.backup {
                Some(backup) => (EscalationTier::Backup, backup),
                None => (EscalationTier::GeneralManager, &self.general_manager),
            },
            _ => (EscalationTier::GeneralManager, &self.general_manager),
        }
    }
}

/// Resolves category hierarchies with static fallback.
pub struct HierarchyResolver {
    store: Arc<dyn HierarchyStore>,
    config: EscalationConfig,
}

impl HierarchyResolver {
    pub fn new(store: Arc<dyn HierarchyStore>, config: EscalationConfig) -> Self {
        Self { store, config }
    }

    /// Resolve the hierarchy for `category` in `tenant_id`.
    ///
    /// A missing category mapping is not an error; store failures are.
    pub async fn resolve(&self, tenant_id: TenantId, category: &str) -> Result<ResolvedHierarchy> {
        let configured = self.store.find_for_category(tenant_id, category).await?;

        let Some(tenant) = configured else {
            debug!(
                target: "escalation",
                tenant_id = %tenant_id,
                category,
                "No category routing configured, using default hierarchy"
            );
            return Ok(self.defaults(HierarchySource::Default, None));
        };

        Ok(self.merge(tenant_id, category, tenant))
    }

    fn merge(&self, tenant_id: TenantId, category: &str, tenant: TenantHierarchy) -> ResolvedHierarchy {
        if tenant.primary.is_none() || tenant.general_manager.is_none() {
            warn!(
                target: "escalation",
                tenant_id = %tenant_id,
                category,
                has_primary = tenant.primary.is_some(),
                has_general_manager = tenant.general_manager.is_some(),
                "Category routing incomplete, filling gaps from default contacts"
            );
        }

        let fallback = self.defaults(HierarchySource::Tenant, tenant.escalation_hours);
        ResolvedHierarchy {
            escalation_hours: fallback.escalation_hours,
            primary: tenant.primary.unwrap_or(fallback.primary),
            backup: tenant.backup.or(fallback.backup),
            general_manager: tenant.general_manager.unwrap_or(fallback.general_manager),
            source: HierarchySource::Tenant,
        }
    }

    fn defaults(&self, source: HierarchySource, hours: Option<f64>) -> ResolvedHierarchy {
        let escalation_hours = match hours {
            Some(h) if h.is_finite() && h > 0.0 => h,
            Some(h) => {
                warn!(
                    target: "escalation",
                    configured = h,
                    "Ignoring non-positive escalation window"
                );
                self.config.default_escalation_hours
            }
            None => self.config.default_escalation_hours,
        };

        ResolvedHierarchy {
            escalation_hours,
            primary: self.config.default_primary.to_contact(),
            backup: self.config.default_backup.as_ref().map(|c| c.to_contact()),
            general_manager: self.config.default_general_manager.to_contact(),
            source,
        }
    }
}
