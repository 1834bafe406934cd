//! Transactional email dispatch.
//!
//! The platform's email provider accepts `{from, to, cc, subject, html}` and
//! answers 2xx on acceptance. Nothing else about the provider is relied on.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FeedbackError, Result};

/// Default timeout for one email API call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// An outbound email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: vec![to.into()],
            cc: Vec::new(),
            subject: subject.into(),
            html: html.into(),
        }
    }

    /// Add a CC recipient unless it is already a direct recipient.
    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        let cc = cc.into();
        if !cc.is_empty() && !self.to.contains(&cc) && !self.cc.contains(&cc) {
            self.cc.push(cc);
        }
        self
    }
}

/// Sends email. Success means the provider accepted the message.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Mailer backed by a JSON-over-HTTP email API.
#[derive(Clone)]
pub struct HttpMailer {
    http_client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpMailer {
    /// Create a mailer posting to `endpoint` with a bearer `api_key`.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::ExternalService` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a mailer with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::ExternalService` if the HTTP client cannot be built.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("guestloop-feedback/1.0")
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                FeedbackError::ExternalService(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait::async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    target: "email",
                    subject = %message.subject,
                    error = %e,
                    "Email API request failed"
                );
                FeedbackError::ExternalService(format!("email API request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(512).collect();
            warn!(
                target: "email",
                status = status.as_u16(),
                subject = %message.subject,
                "Email API rejected message"
            );
            return Err(FeedbackError::ExternalService(format!(
                "email API returned {}: {body}",
                status.as_u16()
            )));
        }

        debug!(target: "email", to = ?message.to, subject = %message.subject, "Email accepted");
        Ok(())
    }
}

/// In-memory mailer for testing. Records every accepted message.
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    sent: Arc<RwLock<Vec<EmailMessage>>>,
    failing: AtomicBool,
    failing_recipients: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make sends addressed to `email` fail.
    pub async fn fail_for(&self, email: impl Into<String>) {
        self.failing_recipients.write().await.insert(email.into());
    }

    /// Messages accepted so far.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.read().await.clone()
    }

    /// Messages accepted for `email` as a direct recipient.
    pub async fn sent_to(&self, email: &str) -> Vec<EmailMessage> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|m| m.to.iter().any(|t| t == email))
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.sent.read().await.len()
    }
}

#[async_trait::async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(FeedbackError::ExternalService(
                "mailer unavailable".to_string(),
            ));
        }
        {
            let failing = self.failing_recipients.read().await;
            if message.to.iter().any(|t| failing.contains(t)) {
                return Err(FeedbackError::ExternalService(format!(
                    "recipient rejected: {}",
                    message.to.join(", ")
                )));
            }
        }
        self.sent.write().await.push(message.clone());
        Ok(())
    }
}
