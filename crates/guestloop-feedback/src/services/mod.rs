//! Feedback domain services.

pub mod approval;
pub mod delayed_send;
pub mod email_queue;
pub mod escalation;
pub mod gate;
pub mod hierarchy;
pub mod lifecycle;
pub mod risk;
pub mod sla;

use std::sync::Arc;

pub use approval::{ApprovalDecision, ApprovalService};
pub use delayed_send::{DelayedSender, SendOutcome};
pub use email_queue::{backoff_delay, EmailQueueProcessor, EmailQueueStats, QueueDelivery};
pub use escalation::{EscalationManager, EscalationOutcome, EscalationReport, REASON_SLA_BREACH};
pub use gate::{GateDecision, ResponseDraft, ResponseRiskGate};
pub use hierarchy::{
    EscalationTier, HierarchyResolver, HierarchySource, ResolvedHierarchy, MAX_ESCALATION_LEVEL,
};
pub use lifecycle::FeedbackLifecycleService;
pub use risk::{
    KeywordRiskClassifier, RiskAssessment, RiskClassifier, Severity, DEFAULT_RISK_KEYWORDS,
    LOW_RATING_THRESHOLD,
};
pub use sla::{decide_action, SlaAction, SlaActionRecord, SlaActionResult, SlaMonitor, SlaRunReport};

use crate::config::FeedbackConfig;
use crate::email::Mailer;
use crate::store::FeedbackStores;

/// Every service wired against one set of stores and one mailer.
#[derive(Clone)]
pub struct FeedbackServices {
    pub sla_monitor: Arc<SlaMonitor>,
    pub escalation: Arc<EscalationManager>,
    pub lifecycle: Arc<FeedbackLifecycleService>,
    pub gate: Arc<ResponseRiskGate>,
    pub delayed_sender: Arc<DelayedSender>,
    pub approvals: Arc<ApprovalService>,
    pub email_queue: Arc<EmailQueueProcessor>,
}

impl FeedbackServices {
    /// Wire services with the default keyword classifier.
    pub fn new(stores: FeedbackStores, mailer: Arc<dyn Mailer>, config: FeedbackConfig) -> Self {
        Self::with_classifier(
            stores,
            mailer,
            Arc::new(KeywordRiskClassifier::default()),
            config,
        )
    }

    pub fn with_classifier(
        stores: FeedbackStores,
        mailer: Arc<dyn Mailer>,
        classifier: Arc<dyn RiskClassifier>,
        config: FeedbackConfig,
    ) -> Self {
        let hierarchy = Arc::new(HierarchyResolver::new(
            stores.hierarchy.clone(),
            config.escalation.clone(),
        ));
        let escalation = Arc::new(EscalationManager::new(
            stores.feedback.clone(),
            hierarchy.clone(),
            stores.escalation_logs.clone(),
            mailer.clone(),
            config.escalation.clone(),
        ));
        let sla_monitor = Arc::new(SlaMonitor::new(
            stores.feedback.clone(),
            hierarchy,
            escalation.clone(),
            mailer.clone(),
            stores.audit.clone(),
            config.escalation.clone(),
        ));
        let email_queue = Arc::new(EmailQueueProcessor::new(
            stores.email_queue.clone(),
            mailer.clone(),
            config.email_queue.clone(),
        ));
        let gate = Arc::new(ResponseRiskGate::new(
            classifier,
            stores.approvals.clone(),
            mailer.clone(),
            stores.audit.clone(),
            config.gate.clone(),
        ));
        let delayed_sender = Arc::new(DelayedSender::new(
            stores.approvals.clone(),
            mailer,
            email_queue.clone(),
            config.gate,
        ));

        let approvals = Arc::new(ApprovalService::new(
            stores.approvals,
            stores.audit,
            delayed_sender.clone(),
        ));

        Self {
            sla_monitor,
            escalation,
            lifecycle: Arc::new(FeedbackLifecycleService::new(stores.feedback)),
            gate,
            delayed_sender,
            approvals,
            email_queue,
        }
    }
}
