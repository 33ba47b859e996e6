//! # Appointly Worker
//!
//! Consumes the notification queue. The API process only enqueues; this
//! process registers the same job types, runs their handlers, and keeps
//! going until it receives Ctrl-C.

pub mod config;

use std::sync::Arc;

use appointly_core::jobs;
use appointly_core::mail::{LogMailer, Mailer};
use appointly_core::queue::{JobBackend, JobFailure, NotificationQueue};
use appointly_db::{DbPool, PgJobBackend};
use eyre::Result;
use tracing::{error, info};

/// Builds a queue over `backend` with every job type registered.
///
/// Exhausted jobs are already logged by the queue; the callback adds the
/// alert line operators search for.
pub fn build_queue(
    config: &config::WorkerConfig,
    backend: Arc<dyn JobBackend>,
    mailer: Arc<dyn Mailer>,
) -> Result<NotificationQueue> {
    let mut queue = NotificationQueue::new(backend)
        .with_poll_interval(config.poll_interval())
        .on_failure(Arc::new(|failure: &JobFailure| {
            error!(
                job_type = %failure.type_key,
                job_id = %failure.job_id,
                attempts = failure.attempts,
                "ALERT: job abandoned after exhausting retries"
            );
        }));
    jobs::register_all(&mut queue, mailer)?;

    Ok(queue)
}

/// Runs the worker against PostgreSQL until Ctrl-C, then drains in-flight jobs.
pub async fn start_worker(config: config::WorkerConfig, db_pool: DbPool) -> Result<()> {
    let backend = PgJobBackend::new(db_pool)
        .with_retry_policy(config.retry_policy())
        .with_lease(config.lease());
    let mailer = Arc::new(LogMailer::new(config.mail_from.clone()));

    let mut queue = build_queue(&config, Arc::new(backend), mailer)?;
    queue.start_processing();
    info!(
        poll_interval_ms = config.poll_interval_ms,
        max_attempts = config.max_attempts,
        "Worker running; press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    queue.shutdown().await;

    Ok(())
}
