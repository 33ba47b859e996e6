//! Persistence and directory ports.
//!
//! Services depend on these traits only. `appointly-db` implements them over
//! PostgreSQL and [`crate::memory`] implements them in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Appointment, Notification, User};

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Inserts `appointment` unless another active appointment already holds
    /// the same provider and hour.
    ///
    /// This is the authoritative double-booking guard: implementations must
    /// make the check and the insert atomic with respect to concurrent callers.
    async fn insert_if_no_active_conflict(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> eyre::Result<Option<Appointment>>;

    /// Active appointments for `provider_id` with `start <= date < end`, ordered by date.
    async fn find_active_for_provider_in_range(
        &self,
        provider_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> eyre::Result<Vec<Appointment>>;

    /// Active appointments booked by `user_id` as client, ordered by date. `page` is 1-based.
    async fn list_active_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> eyre::Result<Vec<Appointment>>;

    async fn update(&self, appointment: &Appointment) -> eyre::Result<Appointment>;

    /// Sets `cancelled_at` only if the appointment is still active.
    ///
    /// Returns `None` when the appointment does not exist or was already
    /// cancelled, so two racing cancellations cannot both succeed.
    async fn mark_cancelled(
        &self,
        id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> eyre::Result<Option<Appointment>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> eyre::Result<Option<User>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, recipient_id: Uuid, content: &str) -> eyre::Result<Notification>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid, limit: usize) -> eyre::Result<Vec<Notification>>;

    async fn mark_read(&self, id: Uuid) -> eyre::Result<Option<Notification>>;
}
