//! Shared fixtures for guestloop-feedback integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use guestloop_core::TenantId;
use guestloop_feedback::{
    Feedback, FeedbackConfig, FeedbackServices, FeedbackStores, InMemoryApprovalStore,
    InMemoryAuditStore, InMemoryEmailQueueStore, InMemoryEscalationLogStore,
    InMemoryFeedbackStore, InMemoryHierarchyStore, InMemoryMailer, ManagerContact,
    ResponseDraft, TenantHierarchy,
};

pub const PRIMARY_EMAIL: &str = "housekeeping@hotel.test";
pub const BACKUP_EMAIL: &str = "frontdesk@hotel.test";
pub const GM_EMAIL: &str = "gm@hotel.test";
pub const MONITORING_EMAIL: &str = "monitoring@guestloop.app";
pub const REVIEWER_EMAIL: &str = "approvals@guestloop.app";
pub const DEFAULT_PRIMARY_EMAIL: &str = "guest-relations@guestloop.app";
pub const DEFAULT_GM_EMAIL: &str = "gm@guestloop.app";

/// Initialize test logging once. Honors `RUST_LOG`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// In-memory stores plus services wired against them.
pub struct TestContext {
    pub tenant_id: TenantId,
    pub feedback: Arc<InMemoryFeedbackStore>,
    pub hierarchy: Arc<InMemoryHierarchyStore>,
    pub escalation_logs: Arc<InMemoryEscalationLogStore>,
    pub approvals: Arc<InMemoryApprovalStore>,
    pub email_queue: Arc<InMemoryEmailQueueStore>,
    pub audit: Arc<InMemoryAuditStore>,
    pub mailer: Arc<InMemoryMailer>,
    pub services: FeedbackServices,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(FeedbackConfig::default())
    }

    pub fn with_config(config: FeedbackConfig) -> Self {
        init_test_logging();

        let feedback = Arc::new(InMemoryFeedbackStore::new());
        let hierarchy = Arc::new(InMemoryHierarchyStore::new());
        let escalation_logs = Arc::new(InMemoryEscalationLogStore::new());
        let approvals = Arc::new(InMemoryApprovalStore::new());
        let email_queue = Arc::new(InMemoryEmailQueueStore::new());
        let audit = Arc::new(InMemoryAuditStore::new());
        let mailer = Arc::new(InMemoryMailer::new());

        let stores = FeedbackStores {
            feedback: feedback.clone(),
            hierarchy: hierarchy.clone(),
            escalation_logs: escalation_logs.clone(),
            approvals: approvals.clone(),
            email_queue: email_queue.clone(),
            audit: audit.clone(),
        };
        let services = FeedbackServices::new(stores, mailer.clone(), config);

        Self {
            tenant_id: TenantId::new(),
            feedback,
            hierarchy,
            escalation_logs,
            approvals,
            email_queue,
            audit,
            mailer,
            services,
        }
    }

    /// Insert an unacknowledged item created `hours` before `now`.
    pub async fn seed_feedback(&self, rating: i32, hours: f64, now: DateTime<Utc>) -> Feedback {
        self.seed_with(rating, hours, now, |_| {}).await
    }

    pub async fn seed_with<F>(
        &self,
        rating: i32,
        hours: f64,
        now: DateTime<Utc>,
        customize: F,
    ) -> Feedback
    where
        F: FnOnce(&mut Feedback),
    {
        let created_at = now - Duration::seconds((hours * 3600.0).round() as i64);
        let mut item = Feedback::new(self.tenant_id, rating, created_at);
        item.comment = Some("The shower was cold.".to_string());
        item.issue_category = Some("housekeeping".to_string());
        item.room_number = Some("214".to_string());
        customize(&mut item);
        self.feedback.insert(item.clone()).await;
        item
    }

    /// Route `housekeeping` to the full three-level hierarchy.
    pub async fn configure_housekeeping(&self, escalation_hours: f64) {
        self.hierarchy
            .set_category(
                self.tenant_id,
                "housekeeping",
                TenantHierarchy {
                    escalation_hours: Some(escalation_hours),
                    primary: Some(contact("Head of Housekeeping", PRIMARY_EMAIL)),
                    backup: Some(contact("Front Desk Lead", BACKUP_EMAIL)),
                    general_manager: Some(contact("General Manager", GM_EMAIL)),
                },
            )
            .await;
    }
}

pub fn contact(name: &str, email: &str) -> ManagerContact {
    ManagerContact {
        id: Some(guestloop_core::ManagerId::new()),
        name: name.to_string(),
        email: email.to_string(),
        department: None,
    }
}

pub fn draft(feedback_text: &str, rating: i32) -> ResponseDraft {
    ResponseDraft {
        feedback_id: None,
        feedback_text: feedback_text.to_string(),
        rating,
        recipient_email: "guest@example.com".to_string(),
        subject: "Thank you for your feedback".to_string(),
        response_html: "<p>Thank you for staying with us.</p>".to_string(),
    }
}
