use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing or invalid caller identity")]
    Unauthenticated,

    #[error("Provider not found")]
    ProviderNotFound,

    #[error("Logged in user is not a provider")]
    NotAProvider,

    #[error("Providers cannot book appointments with themselves")]
    SelfBookingNotAllowed,

    #[error("Past dates are not allowed")]
    PastDateRejected,

    #[error("Provider already scheduled for selected date")]
    SlotAlreadyBooked,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("You don't have permission to cancel this appointment")]
    NotAuthorized,

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Appointments can only be cancelled more than 2 hours in advance")]
    CancellationWindowExpired,

    #[error("Notification not found")]
    NotificationNotFound,

    #[error("No handler registered for job type '{0}'")]
    UnknownJobType(String),

    #[error("A handler is already registered for job type '{0}'")]
    DuplicateJobType(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AgendaError {
    /// Stable machine-readable identifier, paired with the display message at the boundary.
    pub fn code(&self) -> &'static str {
        match self {
            AgendaError::InvalidInput(_) => "invalid_input",
            AgendaError::Unauthenticated => "unauthenticated",
            AgendaError::ProviderNotFound => "provider_not_found",
            AgendaError::NotAProvider => "not_a_provider",
            AgendaError::SelfBookingNotAllowed => "self_booking_not_allowed",
            AgendaError::PastDateRejected => "past_date_rejected",
            AgendaError::SlotAlreadyBooked => "slot_already_booked",
            AgendaError::AppointmentNotFound => "appointment_not_found",
            AgendaError::NotAuthorized => "not_authorized",
            AgendaError::AlreadyCancelled => "already_cancelled",
            AgendaError::CancellationWindowExpired => "cancellation_window_expired",
            AgendaError::NotificationNotFound => "notification_not_found",
            AgendaError::UnknownJobType(_) => "unknown_job_type",
            AgendaError::DuplicateJobType(_) => "duplicate_job_type",
            AgendaError::Database(_) => "database_error",
            AgendaError::Internal(_) => "internal_error",
        }
    }
}

pub type AgendaResult<T> = Result<T, AgendaError>;

/// Failure of the conditional insert in [`crate::repositories::AppointmentStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("provider {provider_id} already has an active appointment at {date}")]
    Conflict {
        provider_id: Uuid,
        date: DateTime<Utc>,
    },

    #[error(transparent)]
    Backend(#[from] eyre::Report),
}

impl From<StoreError> for AgendaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => AgendaError::SlotAlreadyBooked,
            StoreError::Backend(report) => AgendaError::Database(report),
        }
    }
}

/// A best-effort side effect that did not complete.
///
/// The primary operation already succeeded when one of these is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum SideEffectWarning {
    #[error("in-app notification was not recorded: {0}")]
    NotificationNotRecorded(String),

    #[error("cancellation notice was not queued: {0}")]
    NotificationNotQueued(String),
}
