//! # Notification Queue
//!
//! At-least-once background job dispatcher keyed by job type.
//!
//! Jobs are persisted by a [`JobBackend`] before [`NotificationQueue::enqueue`]
//! returns, so they survive a restart of either the enqueuing process or the
//! worker. Consumption starts with [`NotificationQueue::start_processing`],
//! which spawns one consumer task per registered type. Each consumer repeatedly
//! reserves the next ready job, runs its handler in an isolated task and reports
//! the outcome back to the backend:
//!
//! - success marks the job completed;
//! - an error or a panic is recorded as a failed attempt and the backend
//!   decides, through its [`RetryPolicy`], whether to retry after a backoff or
//!   give up;
//! - a job that has exhausted its attempts is logged with its type, id and
//!   error and passed to the failure callback. It is never silently dropped.
//!
//! A job whose worker died mid-delivery is handed out again once its lease
//! expires, which is why handlers must tolerate duplicate delivery.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::{AgendaError, AgendaResult};
use crate::models::{JobHandle, QueuedJob};

/// Storage and redelivery for queued jobs.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Durably stores a new pending job.
    async fn push(&self, type_key: &str, payload: Value) -> eyre::Result<JobHandle>;

    /// Claims the next ready job of `type_key`, counting it as one more attempt.
    ///
    /// Ready means pending with `run_at` reached, or running with an expired lease.
    async fn reserve(&self, type_key: &str) -> eyre::Result<Option<QueuedJob>>;

    async fn complete(&self, job_id: Uuid) -> eyre::Result<()>;

    /// Records a failed attempt and schedules a retry or marks the job failed.
    async fn fail(&self, job: &QueuedJob, error: &str) -> eyre::Result<FailureDisposition>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    Retrying { attempt: u32, retry_at: DateTime<Utc> },
    Exhausted { attempts: u32 },
}

/// Bounded retries with exponential backoff, applied by job backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::seconds(10),
            max_delay: Duration::minutes(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let factor = 1i32 << exponent;
        let delay = self.base_delay * factor;
        delay.min(self.max_delay)
    }

    pub fn disposition(&self, attempts: u32, now: DateTime<Utc>) -> FailureDisposition {
        if attempts >= self.max_attempts {
            FailureDisposition::Exhausted { attempts }
        } else {
            FailureDisposition::Retrying {
                attempt: attempts,
                retry_at: now + self.delay_after(attempts),
            }
        }
    }
}

#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, payload: Value) -> eyre::Result<()>;
}

/// A job that will not be retried again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub type_key: String,
    pub job_id: Uuid,
    pub attempts: u32,
    pub error: String,
}

pub type FailureCallback = Arc<dyn Fn(&JobFailure) + Send + Sync>;

pub struct NotificationQueue {
    backend: Arc<dyn JobBackend>,
    handlers: HashMap<String, Arc<dyn JobHandler>>,
    poll_interval: std::time::Duration,
    on_failure: Option<FailureCallback>,
    shutdown: Option<watch::Sender<bool>>,
    consumers: Vec<JoinHandle<()>>,
}

impl NotificationQueue {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self {
            backend,
            handlers: HashMap::new(),
            poll_interval: std::time::Duration::from_millis(500),
            on_failure: None,
            shutdown: None,
            consumers: Vec::new(),
        }
    }

    /// How long an idle consumer waits before polling the backend again.
    pub fn with_poll_interval(mut self, interval: std::time::Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Called once for every job whose retries are exhausted.
    pub fn on_failure(mut self, callback: FailureCallback) -> Self {
        self.on_failure = Some(callback);
        self
    }

    /// Binds `handler` to `type_key`. Each type may be registered once.
    pub fn register(&mut self, type_key: &str, handler: Arc<dyn JobHandler>) -> AgendaResult<()> {
        if self.handlers.contains_key(type_key) {
            return Err(AgendaError::DuplicateJobType(type_key.to_string()));
        }
        self.handlers.insert(type_key.to_string(), handler);
        Ok(())
    }

    pub fn is_registered(&self, type_key: &str) -> bool {
        self.handlers.contains_key(type_key)
    }

    /// Persists a job and returns without waiting for it to run.
    pub async fn enqueue(&self, type_key: &str, payload: Value) -> AgendaResult<JobHandle> {
        if !self.is_registered(type_key) {
            return Err(AgendaError::UnknownJobType(type_key.to_string()));
        }

        let handle = self.backend.push(type_key, payload).await?;
        debug!(job_type = %handle.type_key, job_id = %handle.id, "Job enqueued");
        Ok(handle)
    }

    /// Starts one consumer per registered job type. Calling it again is a no-op.
    pub fn start_processing(&mut self) {
        if self.shutdown.is_some() {
            warn!("Queue processing already started");
            return;
        }

        let (tx, rx) = watch::channel(false);
        for (type_key, handler) in &self.handlers {
            let consumer = Consumer {
                type_key: type_key.clone(),
                handler: Arc::clone(handler),
                backend: Arc::clone(&self.backend),
                on_failure: self.on_failure.clone(),
                poll_interval: self.poll_interval,
            };
            self.consumers.push(tokio::spawn(consumer.run(rx.clone())));
        }
        self.shutdown = Some(tx);

        info!(types = self.handlers.len(), "Queue processing started");
    }

    /// Stops the consumers after their in-flight job, then waits for them.
    pub async fn shutdown(&mut self) {
        let Some(tx) = self.shutdown.take() else {
            return;
        };
        let _ = tx.send(true);

        for consumer in self.consumers.drain(..) {
            if let Err(e) = consumer.await {
                error!(error = %e, "Queue consumer terminated abnormally");
            }
        }
        info!("Queue processing stopped");
    }
}

struct Consumer {
    type_key: String,
    handler: Arc<dyn JobHandler>,
    backend: Arc<dyn JobBackend>,
    on_failure: Option<FailureCallback>,
    poll_interval: std::time::Duration,
}

impl Consumer {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        debug!(job_type = %self.type_key, "Consumer started");

        while !*shutdown.borrow() {
            match self.backend.reserve(&self.type_key).await {
                Ok(Some(job)) => {
                    self.process(job).await;
                    continue;
                }
                Ok(None) => {}
                Err(e) => error!(job_type = %self.type_key, error = %e, "Failed to reserve job"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    // Queue dropped without a shutdown call.
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        debug!(job_type = %self.type_key, "Consumer stopped");
    }

    async fn process(&self, job: QueuedJob) {
        debug!(job_type = %job.type_key, job_id = %job.id, attempt = job.attempts, "Processing job");

        let handler = Arc::clone(&self.handler);
        let payload = job.payload.clone();
        let outcome = match tokio::spawn(async move { handler.handle(payload).await }).await {
            Ok(result) => result.map_err(|e| format!("{e:#}")),
            Err(join_error) => Err(format!("handler panicked: {join_error}")),
        };

        match outcome {
            Ok(()) => {
                if let Err(e) = self.backend.complete(job.id).await {
                    error!(job_type = %job.type_key, job_id = %job.id, error = %e, "Failed to mark job completed");
                }
            }
            Err(detail) => self.record_failure(&job, detail).await,
        }
    }

    async fn record_failure(&self, job: &QueuedJob, detail: String) {
        match self.backend.fail(job, &detail).await {
            Ok(FailureDisposition::Retrying { attempt, retry_at }) => {
                warn!(
                    job_type = %job.type_key,
                    job_id = %job.id,
                    attempt,
                    %retry_at,
                    error = %detail,
                    "Job failed, will retry"
                );
            }
            Ok(FailureDisposition::Exhausted { attempts }) => {
                error!(
                    job_type = %job.type_key,
                    job_id = %job.id,
                    attempts,
                    error = %detail,
                    "Job permanently failed"
                );
                if let Some(callback) = &self.on_failure {
                    callback(&JobFailure {
                        type_key: job.type_key.clone(),
                        job_id: job.id,
                        attempts,
                        error: detail,
                    });
                }
            }
            Err(e) => {
                error!(
                    job_type = %job.type_key,
                    job_id = %job.id,
                    error = %detail,
                    backend_error = %e,
                    "Failed to record job failure"
                );
            }
        }
    }
}
