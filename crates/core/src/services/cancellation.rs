//! # Cancellation
//!
//! Only the client who booked an appointment may cancel it, only once, and
//! only while more than [`CANCELLATION_NOTICE_HOURS`] remain before it starts.
//!
//! The cancellation is stored first and the provider's mail is queued second.
//! If queueing fails the appointment stays cancelled and the caller gets a
//! warning; a crash between the two steps loses the mail, never the state
//! change.
//!
//! [`CANCELLATION_NOTICE_HOURS`]: crate::models::appointment::CANCELLATION_NOTICE_HOURS

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::Outcome;
use crate::clock::Clock;
use crate::errors::{AgendaError, AgendaResult, SideEffectWarning};
use crate::jobs::{CANCELLATION_MAIL, CancellationMailPayload};
use crate::models::{Appointment, Contact, JobHandle};
use crate::queue::NotificationQueue;
use crate::repositories::{AppointmentStore, UserDirectory};

pub struct CancellationPolicy {
    appointments: Arc<dyn AppointmentStore>,
    users: Arc<dyn UserDirectory>,
    queue: Arc<NotificationQueue>,
    clock: Arc<dyn Clock>,
}

impl CancellationPolicy {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        users: Arc<dyn UserDirectory>,
        queue: Arc<NotificationQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            users,
            queue,
            clock,
        }
    }

    pub async fn cancel_appointment(
        &self,
        requesting_user_id: Uuid,
        appointment_id: Uuid,
    ) -> AgendaResult<Outcome<Appointment>> {
        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(AgendaError::AppointmentNotFound)?;

        if appointment.client_id != requesting_user_id {
            return Err(AgendaError::NotAuthorized);
        }

        if !appointment.is_active() {
            return Err(AgendaError::AlreadyCancelled);
        }

        let now = self.clock.now();
        if !appointment.is_cancellable(now) {
            return Err(AgendaError::CancellationWindowExpired);
        }

        // A concurrent cancellation may have landed since the read above.
        let cancelled = self
            .appointments
            .mark_cancelled(appointment_id, now)
            .await?
            .ok_or(AgendaError::AlreadyCancelled)?;

        info!(appointment_id = %cancelled.id, client_id = %requesting_user_id, "Appointment cancelled");

        let warning = self.queue_notice(&cancelled).await.err();
        Ok(Outcome::new(cancelled, warning))
    }

    async fn queue_notice(&self, appointment: &Appointment) -> Result<JobHandle, SideEffectWarning> {
        let result: AgendaResult<JobHandle> = async {
            let client = self.contact(appointment.client_id).await?;
            let provider = self.contact(appointment.provider_id).await?;
            let payload = serde_json::to_value(CancellationMailPayload {
                appointment: appointment.clone(),
                client,
                provider,
            })
            .map_err(|e| AgendaError::Internal(Box::new(e)))?;

            self.queue.enqueue(CANCELLATION_MAIL, payload).await
        }
        .await;

        result.map_err(|e| {
            warn!(appointment_id = %appointment.id, error = %e, "Cancellation notice not queued");
            SideEffectWarning::NotificationNotQueued(e.to_string())
        })
    }

    async fn contact(&self, user_id: Uuid) -> AgendaResult<Contact> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .as_ref()
            .map(Contact::from)
            .ok_or_else(|| AgendaError::InvalidInput(format!("User {user_id} not found")))
    }
}
