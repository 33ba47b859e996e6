//! # Scheduling
//!
//! Creates appointments and lists them.
//!
//! Booking validation runs in a fixed order and stops at the first failure:
//!
//! 1. the provider exists and is a provider (`ProviderNotFound`)
//! 2. the provider is not the client (`SelfBookingNotAllowed`)
//! 3. the requested hour has not started before now (`PastDateRejected`)
//! 4. the provider has no active appointment at that hour (`SlotAlreadyBooked`)
//!
//! Step 4 is only a fast path. Two requests can both pass it, so the insert
//! itself goes through [`AppointmentStore::insert_if_no_active_conflict`] and a
//! lost race is reported as `SlotAlreadyBooked` as well.
//!
//! Once the appointment is stored the provider gets an in-app notification.
//! That step is best effort: its failure is returned as a warning next to the
//! booked appointment.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::Outcome;
use crate::clock::Clock;
use crate::errors::{AgendaError, AgendaResult, SideEffectWarning};
use crate::models::appointment::AppointmentResponse;
use crate::models::{Appointment, ProviderSummary};
use crate::repositories::{AppointmentStore, NotificationStore, UserDirectory};
use crate::time::{day_bounds, truncate_to_hour};

/// Page size for a client's appointment listing.
pub const APPOINTMENTS_PAGE_SIZE: u32 = 20;

pub struct SchedulingService {
    appointments: Arc<dyn AppointmentStore>,
    users: Arc<dyn UserDirectory>,
    notifications: Arc<dyn NotificationStore>,
    clock: Arc<dyn Clock>,
}

impl SchedulingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        users: Arc<dyn UserDirectory>,
        notifications: Arc<dyn NotificationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            users,
            notifications,
            clock,
        }
    }

    pub async fn create_appointment(
        &self,
        client_id: Uuid,
        provider_id: Uuid,
        requested_date: DateTime<Utc>,
    ) -> AgendaResult<Outcome<Appointment>> {
        self.users
            .find_user_by_id(provider_id)
            .await?
            .filter(|user| user.is_provider)
            .ok_or(AgendaError::ProviderNotFound)?;

        if provider_id == client_id {
            return Err(AgendaError::SelfBookingNotAllowed);
        }

        let hour_start = truncate_to_hour(requested_date);
        let now = self.clock.now();
        if hour_start < now {
            return Err(AgendaError::PastDateRejected);
        }

        let taken = self
            .appointments
            .find_active_for_provider_in_range(provider_id, hour_start, hour_start + Duration::hours(1))
            .await?;
        if !taken.is_empty() {
            return Err(AgendaError::SlotAlreadyBooked);
        }

        let appointment = self
            .appointments
            .insert_if_no_active_conflict(Appointment::new(client_id, provider_id, hour_start, now))
            .await?;

        info!(
            appointment_id = %appointment.id,
            %provider_id,
            %client_id,
            date = %appointment.date,
            "Appointment booked"
        );

        let warning = self.notify_provider(&appointment).await.err();
        Ok(Outcome::new(appointment, warning))
    }

    /// Active appointments the user booked as a client, with provider details.
    pub async fn list_for_client(&self, user_id: Uuid, page: Option<u32>) -> AgendaResult<Vec<AppointmentResponse>> {
        let page = page.unwrap_or(1).max(1);
        let appointments = self
            .appointments
            .list_active_for_user(user_id, page, APPOINTMENTS_PAGE_SIZE)
            .await?;

        let now = self.clock.now();
        let mut listed = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let provider = self
                .users
                .find_user_by_id(appointment.provider_id)
                .await?
                .as_ref()
                .map(ProviderSummary::from);
            listed.push(AppointmentResponse::new(appointment, provider, now));
        }

        Ok(listed)
    }

    /// The calling provider's active appointments on `day`, earliest first.
    pub async fn provider_schedule(&self, provider_id: Uuid, day: NaiveDate) -> AgendaResult<Vec<Appointment>> {
        self.users
            .find_user_by_id(provider_id)
            .await?
            .filter(|user| user.is_provider)
            .ok_or(AgendaError::NotAProvider)?;

        let (start, end) = day_bounds(day);
        let appointments = self
            .appointments
            .find_active_for_provider_in_range(provider_id, start, end)
            .await?;

        Ok(appointments)
    }

    async fn notify_provider(&self, appointment: &Appointment) -> Result<(), SideEffectWarning> {
        let result: eyre::Result<_> = async {
            let client_name = self
                .users
                .find_user_by_id(appointment.client_id)
                .await?
                .map(|user| user.name)
                .unwrap_or_else(|| "a client".to_string());

            let content = format!(
                "New appointment with {} on {}",
                client_name,
                appointment.date.format("%B %-d, at %H:%M")
            );
            self.notifications.create(appointment.provider_id, &content).await
        }
        .await;

        result.map(|_| ()).map_err(|e| {
            warn!(appointment_id = %appointment.id, error = %e, "Provider notification not recorded");
            SideEffectWarning::NotificationNotRecorded(e.to_string())
        })
    }
}
