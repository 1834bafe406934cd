//! Guestloop feedback server.
//!
//! Serves the feedback HTTP API and runs the SLA monitor, email retry
//! queue and approval expiry loops in-process.

mod config;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use guestloop_api_feedback::{
    feedback_router, ApprovalExpirationJob, EmailQueueJob, FeedbackState, SlaMonitoringJob,
};
use guestloop_feedback::{FeedbackServices, FeedbackStores, HttpMailer, Mailer};

use crate::config::Config;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("FATAL: Configuration error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);
    info!(
        host = %config.host,
        port = config.port,
        sla_tenants = config.feedback.escalation.tenant_ids.len(),
        "Starting guestloop-server"
    );

    let pool = match guestloop_db::connect(&config.database_url, config.db_max_connections).await
    {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };
    info!("Database connection pool established");

    let mailer: Arc<dyn Mailer> =
        match HttpMailer::new(config.email_api_url.clone(), config.email_api_key.clone()) {
            Ok(m) => Arc::new(m),
            Err(e) => {
                tracing::error!("Failed to build email client: {e}");
                std::process::exit(1);
            }
        };

    let services = FeedbackServices::new(
        FeedbackStores::postgres(pool),
        mailer,
        config.feedback.clone(),
    );

    let shutdown = CancellationToken::new();

    // SLA compliance loop
    {
        let job = SlaMonitoringJob::new(services.sla_monitor.clone());
        let interval = Duration::from_secs(config.sla_poll_interval_secs);
        let token = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(interval) => {}
                }
                if let Err(e) = job.poll().await {
                    tracing::warn!(target: "sla", error = %e, "SLA check failed");
                }
            }
        });
        info!("SLA monitoring job started");
    }

    // Email retry queue loop
    {
        let job = EmailQueueJob::new(services.email_queue.clone())
            .with_batch_size(config.email_batch_size);
        let interval = Duration::from_secs(config.email_queue_poll_interval_secs);
        let token = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(interval) => {}
                }
                if let Err(e) = job.poll().await {
                    tracing::warn!(target: "email_queue", error = %e, "Email queue pass failed");
                }
            }
        });
        info!("Email queue job started");
    }

    // Approval expiry loop
    {
        let job = ApprovalExpirationJob::new(services.approvals.clone());
        let interval = Duration::from_secs(config.approval_expiry_poll_interval_secs);
        let token = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(interval) => {}
                }
                if let Err(e) = job.poll().await {
                    tracing::warn!(
                        target: "approvals",
                        error = %e,
                        "Failed to expire response approvals"
                    );
                }
            }
        });
        info!("Approval expiration job started");
    }

    let state = FeedbackState::new(services).with_email_batch_size(config.email_batch_size);
    let app = feedback_router(state);

    let listener = match TcpListener::bind(config.bind_addr()).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {e}", config.bind_addr());
            std::process::exit(1);
        }
    };
    info!(addr = %config.bind_addr(), "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    shutdown.cancel();
    info!("Server shutdown complete");
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
