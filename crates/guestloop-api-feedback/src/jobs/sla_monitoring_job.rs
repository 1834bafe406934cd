//! SLA Monitoring Job.
//!
//! Runs the SLA compliance check on a fixed interval.

use std::sync::Arc;

use tracing::{info, instrument};

use guestloop_feedback::{FeedbackError, SlaMonitor, SlaRunReport};

/// Default polling interval in seconds (5 minutes).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Job wrapping [`SlaMonitor::check_compliance`].
pub struct SlaMonitoringJob {
    monitor: Arc<SlaMonitor>,
}

/// Statistics from SLA monitoring passes.
#[derive(Debug, Clone, Default)]
pub struct SlaMonitoringStats {
    /// Open items checked.
    pub checked: usize,
    pub reminders_sent: usize,
    pub escalated: usize,
    pub max_escalation_reached: usize,
    /// Items whose action failed.
    pub failed: usize,
}

impl From<&SlaRunReport> for SlaMonitoringStats {
    fn from(report: &SlaRunReport) -> Self {
        Self {
            checked: report.checked,
            reminders_sent: report.reminders_sent,
            escalated: report.escalated,
            max_escalation_reached: report.max_escalation_reached,
            failed: report.failed,
        }
    }
}

/// Errors that can occur during SLA monitoring.
#[derive(Debug, thiserror::Error)]
pub enum SlaMonitoringJobError {
    #[error("Service error: {0}")]
    Service(#[from] FeedbackError),
}

impl SlaMonitoringJob {
    #[must_use]
    pub fn new(monitor: Arc<SlaMonitor>) -> Self {
        Self { monitor }
    }

    /// Run a single poll cycle.
    #[instrument(skip(self))]
    pub async fn poll(&self) -> Result<SlaMonitoringStats, SlaMonitoringJobError> {
        let report = self.monitor.check_compliance().await?;
        let stats = SlaMonitoringStats::from(&report);

        if stats.reminders_sent + stats.escalated + stats.failed > 0 {
            info!(
                checked = stats.checked,
                reminders_sent = stats.reminders_sent,
                escalated = stats.escalated,
                failed = stats.failed,
                "SLA monitoring poll cycle complete"
            );
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_report() {
        let report = SlaRunReport {
            checked: 4,
            reminders_sent: 1,
            escalated: 2,
            skipped: 1,
            ..Default::default()
        };
        let stats = SlaMonitoringStats::from(&report);
        assert_eq!(stats.checked, 4);
        assert_eq!(stats.escalated, 2);
        assert_eq!(stats.failed, 0);
    }
}
