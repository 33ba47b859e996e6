use appointly_core::errors::StoreError;
use appointly_core::models::Appointment;
use appointly_core::repositories::AppointmentStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::DbPool;
use crate::models::DbAppointment;

/// Inserts `appointment` unless an active appointment already holds its
/// provider and hour. `None` means the slot was taken.
///
/// The check is the `idx_appointments_active_slot` partial unique index, so it
/// holds across concurrent transactions.
pub async fn create_appointment(
    pool: &Pool<Postgres>,
    appointment: &Appointment,
) -> Result<Option<DbAppointment>> {
    let created = sqlx::query_as::<_, DbAppointment>(
        r#"
        INSERT INTO appointments (id, date, client_id, provider_id, cancelled_at, created_at)
        VALUES ($1, $2, $3, $4, NULL, $5)
        ON CONFLICT (provider_id, date) WHERE cancelled_at IS NULL DO NOTHING
        RETURNING id, date, client_id, provider_id, cancelled_at, created_at
        "#,
    )
    .bind(appointment.id)
    .bind(appointment.date)
    .bind(appointment.client_id)
    .bind(appointment.provider_id)
    .bind(appointment.created_at)
    .fetch_optional(pool)
    .await?;

    if created.is_none() {
        debug!(
            "Slot taken: provider_id={}, date={}",
            appointment.provider_id, appointment.date
        );
    }

    Ok(created)
}

pub async fn get_appointment_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, client_id, provider_id, cancelled_at, created_at
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_active_appointments_for_provider(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, client_id, provider_id, cancelled_at, created_at
        FROM appointments
        WHERE provider_id = $1
          AND cancelled_at IS NULL
          AND date >= $2
          AND date < $3
        ORDER BY date ASC
        "#,
    )
    .bind(provider_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn get_active_appointments_for_client(
    pool: &Pool<Postgres>,
    client_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, client_id, provider_id, cancelled_at, created_at
        FROM appointments
        WHERE client_id = $1
          AND cancelled_at IS NULL
        ORDER BY date ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(client_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn update_appointment(pool: &Pool<Postgres>, appointment: &Appointment) -> Result<DbAppointment> {
    let updated = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET date = $2, client_id = $3, provider_id = $4, cancelled_at = $5
        WHERE id = $1
        RETURNING id, date, client_id, provider_id, cancelled_at, created_at
        "#,
    )
    .bind(appointment.id)
    .bind(appointment.date)
    .bind(appointment.client_id)
    .bind(appointment.provider_id)
    .bind(appointment.cancelled_at)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| eyre!("Appointment {} not found", appointment.id))?;

    Ok(updated)
}

/// Cancels the appointment if it is still active. `None` when it does not
/// exist or someone else cancelled it first.
pub async fn cancel_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    cancelled_at: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    let cancelled = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET cancelled_at = $2
        WHERE id = $1 AND cancelled_at IS NULL
        RETURNING id, date, client_id, provider_id, cancelled_at, created_at
        "#,
    )
    .bind(id)
    .bind(cancelled_at)
    .fetch_optional(pool)
    .await?;

    Ok(cancelled)
}

#[derive(Debug, Clone)]
pub struct PgAppointmentStore {
    pool: DbPool,
}

impl PgAppointmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn insert_if_no_active_conflict(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        match create_appointment(&self.pool, &appointment).await? {
            Some(row) => Ok(row.into()),
            None => Err(StoreError::Conflict {
                provider_id: appointment.provider_id,
                date: appointment.date,
            }),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>> {
        Ok(get_appointment_by_id(&self.pool, id).await?.map(Appointment::from))
    }

    async fn find_active_for_provider_in_range(
        &self,
        provider_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let rows = get_active_appointments_for_provider(&self.pool, provider_id, start, end).await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn list_active_for_user(&self, user_id: Uuid, page: u32, page_size: u32) -> Result<Vec<Appointment>> {
        let limit = i64::from(page_size);
        let offset = i64::from(page.saturating_sub(1)) * limit;
        let rows = get_active_appointments_for_client(&self.pool, user_id, limit, offset).await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment> {
        Ok(update_appointment(&self.pool, appointment).await?.into())
    }

    async fn mark_cancelled(&self, id: Uuid, cancelled_at: DateTime<Utc>) -> Result<Option<Appointment>> {
        Ok(cancel_appointment(&self.pool, id, cancelled_at).await?.map(Appointment::from))
    }
}
