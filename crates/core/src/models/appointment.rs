use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::ProviderSummary;
use crate::errors::SideEffectWarning;
use crate::time::truncate_to_hour;

/// Minimum lead time, in hours, required to cancel an appointment.
pub const CANCELLATION_NOTICE_HOURS: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// Start of the booked hour.
    pub date: DateTime<Utc>,
    pub client_id: Uuid,
    pub provider_id: Uuid,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Builds a new active appointment for the hour containing `date`.
    pub fn new(client_id: Uuid, provider_id: Uuid, date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: truncate_to_hour(date),
            client_id,
            provider_id,
            cancelled_at: None,
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancelled_at.is_none()
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }

    /// True while the appointment is active and more than the notice window away.
    pub fn is_cancellable(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && now < self.date - Duration::hours(CANCELLATION_NOTICE_HOURS)
    }
}

/// Body of `POST /appointments`.
///
/// Fields are optional so that a missing one surfaces as a validation error
/// rather than a deserialisation rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub provider_id: Option<Uuid>,
    pub date: Option<String>,
}

/// An appointment as listed for its client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub past: bool,
    pub cancelable: bool,
    pub provider: Option<ProviderSummary>,
}

impl AppointmentResponse {
    pub fn new(appointment: Appointment, provider: Option<ProviderSummary>, now: DateTime<Utc>) -> Self {
        Self {
            past: appointment.is_past(now),
            cancelable: appointment.is_cancellable(now),
            appointment,
            provider,
        }
    }
}

/// Result of a booking or cancellation, with any side effect that did not complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentOutcomeResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<SideEffectWarning>,
}
