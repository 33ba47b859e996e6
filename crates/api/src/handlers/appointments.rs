use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use appointly_core::{
    errors::AgendaError,
    models::{
        appointment::{AppointmentOutcomeResponse, AppointmentResponse, CreateAppointmentRequest},
        query::PageQuery,
    },
    time::parse_timestamp,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError},
};

/// `POST /appointments`
///
/// Books the hour containing `date` with `provider_id` for the caller. A
/// failed provider notification does not undo the booking; it is reported in
/// the response's `warning` field.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<Json<AppointmentOutcomeResponse>, AppError> {
    let Json(payload) = payload?;

    let provider_id = payload
        .provider_id
        .ok_or_else(|| AgendaError::InvalidInput("provider_id is required".to_string()))?;
    let date = payload
        .date
        .as_deref()
        .ok_or_else(|| AgendaError::InvalidInput("date is required".to_string()))
        .and_then(parse_timestamp)?;

    let outcome = state
        .scheduling
        .create_appointment(user.id(), provider_id, date)
        .await?;

    Ok(Json(AppointmentOutcomeResponse {
        appointment: outcome.value,
        warning: outcome.warning,
    }))
}

/// `GET /appointments?page=`
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let Query(query) = query?;
    let appointments = state.scheduling.list_for_client(user.id(), query.page).await?;

    Ok(Json(appointments))
}

/// `DELETE /appointments/:id`
///
/// Only the booking client may cancel, and only more than two hours ahead.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentOutcomeResponse>, AppError> {
    let outcome = state.cancellation.cancel_appointment(user.id(), id).await?;

    Ok(Json(AppointmentOutcomeResponse {
        appointment: outcome.value,
        warning: outcome.warning,
    }))
}
