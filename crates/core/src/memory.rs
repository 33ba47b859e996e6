//! In-process implementations of the ports.
//!
//! They honour the same contracts as the PostgreSQL implementations, including
//! the atomic conflict check on insert and the conditional cancel, and back the
//! test suites of every crate in the workspace. Nothing here survives the
//! process; "restarting" means building new services over the same instances.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::errors::StoreError;
use crate::models::{Appointment, JobHandle, JobStatus, Notification, QueuedJob, User};
use crate::queue::{FailureDisposition, JobBackend, RetryPolicy};
use crate::repositories::{AppointmentStore, NotificationStore, UserDirectory};

#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Appointment> {
        let mut all: Vec<_> = self.appointments.lock().await.values().cloned().collect();
        all.sort_by_key(|a| (a.date, a.created_at));
        all
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert_if_no_active_conflict(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.lock().await;
        let conflict = appointments
            .values()
            .any(|a| a.is_active() && a.provider_id == appointment.provider_id && a.date == appointment.date);
        if conflict {
            return Err(StoreError::Conflict {
                provider_id: appointment.provider_id,
                date: appointment.date,
            });
        }

        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> eyre::Result<Option<Appointment>> {
        Ok(self.appointments.lock().await.get(&id).cloned())
    }

    async fn find_active_for_provider_in_range(
        &self,
        provider_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> eyre::Result<Vec<Appointment>> {
        let mut found: Vec<_> = self
            .appointments
            .lock()
            .await
            .values()
            .filter(|a| a.is_active() && a.provider_id == provider_id && a.date >= start && a.date < end)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.date);
        Ok(found)
    }

    async fn list_active_for_user(&self, user_id: Uuid, page: u32, page_size: u32) -> eyre::Result<Vec<Appointment>> {
        let mut found: Vec<_> = self
            .appointments
            .lock()
            .await
            .values()
            .filter(|a| a.is_active() && a.client_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.date);

        let skip = page.saturating_sub(1) as usize * page_size as usize;
        Ok(found.into_iter().skip(skip).take(page_size as usize).collect())
    }

    async fn update(&self, appointment: &Appointment) -> eyre::Result<Appointment> {
        let mut appointments = self.appointments.lock().await;
        let stored = appointments
            .get_mut(&appointment.id)
            .ok_or_else(|| eyre::eyre!("Appointment {} not found", appointment.id))?;
        *stored = appointment.clone();
        Ok(stored.clone())
    }

    async fn mark_cancelled(&self, id: Uuid, cancelled_at: DateTime<Utc>) -> eyre::Result<Option<Appointment>> {
        let mut appointments = self.appointments.lock().await;
        Ok(appointments
            .get_mut(&id)
            .filter(|a| a.is_active())
            .map(|a| {
                a.cancelled_at = Some(cancelled_at);
                a.clone()
            }))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user_by_id(&self, id: Uuid) -> eyre::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    // Insertion order; listing reverses it.
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, recipient_id: Uuid, content: &str) -> eyre::Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_id,
            content: content.to_string(),
            read: false,
            created_at: Utc::now(),
        };
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: usize) -> eyre::Result<Vec<Notification>> {
        let mut found: Vec<_> = self
            .notifications
            .read()
            .await
            .iter()
            .rev()
            .filter(|n| n.recipient_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit);
        Ok(found)
    }

    async fn mark_read(&self, id: Uuid) -> eyre::Result<Option<Notification>> {
        let mut notifications = self.notifications.write().await;
        Ok(notifications.iter_mut().find(|n| n.id == id).map(|n| {
            n.read = true;
            n.clone()
        }))
    }
}

pub struct InMemoryJobBackend {
    jobs: Mutex<Vec<QueuedJob>>,
    retry_policy: RetryPolicy,
    lease: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryJobBackend {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl InMemoryJobBackend {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            retry_policy,
            lease: Duration::minutes(5),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn jobs(&self) -> Vec<QueuedJob> {
        self.jobs.lock().await.clone()
    }

    pub async fn jobs_of_type(&self, type_key: &str) -> Vec<QueuedJob> {
        self.jobs
            .lock()
            .await
            .iter()
            .filter(|j| j.type_key == type_key)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JobBackend for InMemoryJobBackend {
    async fn push(&self, type_key: &str, payload: Value) -> eyre::Result<JobHandle> {
        let now = self.clock.now();
        let job = QueuedJob {
            id: Uuid::new_v4(),
            type_key: type_key.to_string(),
            payload,
            status: JobStatus::Pending,
            attempts: 0,
            run_at: now,
            locked_at: None,
            last_error: None,
            created_at: now,
        };
        let handle = job.handle();
        self.jobs.lock().await.push(job);
        Ok(handle)
    }

    async fn reserve(&self, type_key: &str) -> eyre::Result<Option<QueuedJob>> {
        let now = self.clock.now();
        let mut jobs = self.jobs.lock().await;
        let ready = jobs
            .iter_mut()
            .filter(|j| j.type_key == type_key)
            .filter(|j| match j.status {
                JobStatus::Pending => j.run_at <= now,
                JobStatus::Running => j.locked_at.is_some_and(|at| at + self.lease < now),
                JobStatus::Completed | JobStatus::Failed => false,
            })
            .min_by_key(|j| j.run_at);

        Ok(ready.map(|job| {
            job.status = JobStatus::Running;
            job.locked_at = Some(now);
            job.attempts += 1;
            job.clone()
        }))
    }

    async fn complete(&self, job_id: Uuid) -> eyre::Result<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or_else(|| eyre::eyre!("Job {job_id} not found"))?;
        job.status = JobStatus::Completed;
        job.locked_at = None;
        Ok(())
    }

    async fn fail(&self, job: &QueuedJob, error: &str) -> eyre::Result<FailureDisposition> {
        let now = self.clock.now();
        let mut jobs = self.jobs.lock().await;
        let stored = jobs
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or_else(|| eyre::eyre!("Job {} not found", job.id))?;

        let disposition = self.retry_policy.disposition(stored.attempts, now);
        stored.last_error = Some(error.to_string());
        stored.locked_at = None;
        match disposition {
            FailureDisposition::Retrying { retry_at, .. } => {
                stored.status = JobStatus::Pending;
                stored.run_at = retry_at;
            }
            FailureDisposition::Exhausted { .. } => stored.status = JobStatus::Failed,
        }
        Ok(disposition)
    }
}
