use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use appointly_core::{
    models::{Appointment, query::DayQuery},
    time::parse_day,
};
use std::sync::Arc;

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError},
};

/// `GET /schedule?date=`: the calling provider's appointments for one day.
#[axum::debug_handler]
pub async fn provider_schedule(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let Query(query) = query?;
    let day = parse_day(query.date.as_deref())?;
    let appointments = state.scheduling.provider_schedule(user.id(), day).await?;

    Ok(Json(appointments))
}
