//! # Error Handling Middleware
//!
//! Maps `AgendaError` to HTTP status codes and a uniform JSON body:
//!
//! ```json
//! { "error": { "code": "slot_already_booked", "message": "Provider already scheduled for selected date" } }
//! ```
//!
//! Infrastructure failures are logged in full and returned with a generic
//! message so storage details never reach the client.

use appointly_core::errors::AgendaError;
use axum::{
    BoxError, Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use appointly_api::middleware::error_handling::AppError;
/// use appointly_core::errors::AgendaError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(AgendaError::AppointmentNotFound.into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub AgendaError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AgendaError::InvalidInput(_)
            | AgendaError::SelfBookingNotAllowed
            | AgendaError::PastDateRejected
            | AgendaError::CancellationWindowExpired
            | AgendaError::NotAProvider => StatusCode::BAD_REQUEST,
            AgendaError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AgendaError::NotAuthorized => StatusCode::FORBIDDEN,
            AgendaError::ProviderNotFound
            | AgendaError::AppointmentNotFound
            | AgendaError::NotificationNotFound => StatusCode::NOT_FOUND,
            AgendaError::SlotAlreadyBooked | AgendaError::AlreadyCancelled => StatusCode::CONFLICT,
            AgendaError::UnknownJobType(_)
            | AgendaError::DuplicateJobType(_)
            | AgendaError::Database(_)
            | AgendaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            error!(code = self.0.code(), "Request failed: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": self.0.code(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Allows `?` on `AgendaResult` inside handlers.
impl From<AgendaError> for AppError {
    fn from(err: AgendaError) -> Self {
        AppError(err)
    }
}

/// Infrastructure errors surface as `AgendaError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(AgendaError::Database(err))
    }
}

/// Malformed or mistyped JSON bodies are validation failures.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(AgendaError::InvalidInput(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(AgendaError::InvalidInput(rejection.body_text()))
    }
}

/// Maps an `AgendaError` straight to a response.
pub fn map_error(err: AgendaError) -> Response {
    AppError(err).into_response()
}

/// Converts failures from the timeout layer into responses.
pub async fn handle_timeout(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        let body = Json(json!({
            "error": {
                "code": "request_timeout",
                "message": "Request timed out",
            }
        }));
        (StatusCode::REQUEST_TIMEOUT, body).into_response()
    } else {
        map_error(AgendaError::Internal(err))
    }
}
