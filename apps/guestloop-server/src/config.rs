//! Application configuration loaded from environment variables.
//!
//! Loading fails fast: required variables must be present and every
//! optional variable that is set must parse.

use std::env;
use std::str::FromStr;

use guestloop_core::TenantId;
use guestloop_feedback::{ContactConfig, FeedbackConfig};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub rust_log: String,
    pub host: String,
    pub port: u16,

    /// Transactional email API endpoint.
    pub email_api_url: String,
    pub email_api_key: String,

    pub sla_poll_interval_secs: u64,
    pub email_queue_poll_interval_secs: u64,
    pub approval_expiry_poll_interval_secs: u64,
    pub email_batch_size: usize,

    pub feedback: FeedbackConfig,
}

impl Config {
    /// Load configuration from the process environment and `.env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".into()))?;
        let email_api_url = lookup("EMAIL_API_URL")
            .ok_or_else(|| ConfigError::MissingVar("EMAIL_API_URL".into()))?;
        let email_api_key = lookup("EMAIL_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("EMAIL_API_KEY".into()))?;

        let port: u16 = lookup("PORT").unwrap_or_else(|| "8080".to_string()).parse()?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        let mut feedback = FeedbackConfig::default();

        let escalation = &mut feedback.escalation;
        if let Some(hours) = parse_opt::<f64, _>(&lookup, "ESCALATION_HOURS")? {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    var: "ESCALATION_HOURS".to_string(),
                    message: "Must be a positive number of hours".to_string(),
                });
            }
            escalation.default_escalation_hours = hours;
        }
        if let Some(hours) = parse_opt::<f64, _>(&lookup, "REMINDER_AFTER_HOURS")? {
            escalation.reminder_after_hours = hours;
        }
        if let Some(email) = lookup("DEFAULT_PRIMARY_EMAIL") {
            let name = lookup("DEFAULT_PRIMARY_NAME")
                .unwrap_or_else(|| escalation.default_primary.name.clone());
            escalation.default_primary = ContactConfig::new(name, email);
        }
        if let Some(email) = lookup("DEFAULT_BACKUP_EMAIL") {
            let name = lookup("DEFAULT_BACKUP_NAME").unwrap_or_else(|| "Backup Manager".into());
            escalation.default_backup = Some(ContactConfig::new(name, email));
        }
        if let Some(email) = lookup("DEFAULT_GM_EMAIL") {
            let name = lookup("DEFAULT_GM_NAME")
                .unwrap_or_else(|| escalation.default_general_manager.name.clone());
            escalation.default_general_manager = ContactConfig::new(name, email);
        }
        if let Some(email) = lookup("MONITORING_EMAIL") {
            escalation.monitoring_email = email;
        }
        if let Some(raw) = lookup("SLA_TENANT_IDS") {
            escalation.tenant_ids = parse_tenant_ids(&raw)?;
        }

        let from_address = lookup("EMAIL_FROM");
        if let Some(from) = &from_address {
            feedback.escalation.from_address = from.clone();
            feedback.gate.from_address = from.clone();
        }
        if let Some(email) = lookup("REVIEWER_EMAIL") {
            feedback.gate.reviewer_email = email;
        }
        if let Some(secs) = parse_opt::<i64, _>(&lookup, "APPROVAL_TIMEOUT_SECS")? {
            feedback.gate.approval_timeout_secs = secs;
        }
        if let Some(secs) = parse_opt::<u64, _>(&lookup, "SEND_DELAY_SECS")? {
            feedback.gate.send_delay_secs = secs;
        }
        if let Some(attempts) = parse_opt::<i32, _>(&lookup, "EMAIL_MAX_ATTEMPTS")? {
            if attempts < 1 {
                return Err(ConfigError::InvalidValue {
                    var: "EMAIL_MAX_ATTEMPTS".to_string(),
                    message: "Must be at least 1".to_string(),
                });
            }
            feedback.email_queue.max_attempts = attempts;
        }

        Ok(Self {
            database_url,
            db_max_connections: parse_opt(&lookup, "DB_MAX_CONNECTIONS")?
                .unwrap_or(guestloop_db::DEFAULT_MAX_CONNECTIONS),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            email_api_url,
            email_api_key,
            sla_poll_interval_secs: parse_opt(&lookup, "SLA_POLL_INTERVAL_SECS")?
                .unwrap_or(guestloop_api_feedback::jobs::sla_monitoring_job::DEFAULT_POLL_INTERVAL_SECS),
            email_queue_poll_interval_secs: parse_opt(&lookup, "EMAIL_QUEUE_POLL_INTERVAL_SECS")?
                .unwrap_or(guestloop_api_feedback::jobs::email_queue_job::DEFAULT_POLL_INTERVAL_SECS),
            approval_expiry_poll_interval_secs: parse_opt(
                &lookup,
                "APPROVAL_EXPIRY_POLL_INTERVAL_SECS",
            )?
            .unwrap_or(
                guestloop_api_feedback::jobs::approval_expiration_job::DEFAULT_POLL_INTERVAL_SECS,
            ),
            email_batch_size: parse_opt(&lookup, "EMAIL_BATCH_SIZE")?
                .unwrap_or(guestloop_api_feedback::jobs::email_queue_job::DEFAULT_BATCH_SIZE),
            feedback,
        })
    }

    /// Socket address string for the HTTP listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_opt<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                var: var.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}

fn parse_tenant_ids(raw: &str) -> Result<Vec<TenantId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<TenantId>()
                .map_err(|e| ConfigError::InvalidValue {
                    var: "SLA_TENANT_IDS".to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}
