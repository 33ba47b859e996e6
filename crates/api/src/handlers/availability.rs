//! # Availability Handlers
//!
//! Exposes a provider's hourly slots for one day. The slot table itself is
//! computed in `appointly_core::availability`; this handler only resolves
//! the query string.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use appointly_core::models::{Slot, query::DayQuery};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError},
};

/// `GET /providers/:provider_id/available?date=`
///
/// Returns the twelve slots from 08:00 to 19:00 UTC with their availability.
/// `date` may be epoch milliseconds, `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// # Errors
///
/// * `InvalidInput` - `date` is missing or cannot be parsed
#[axum::debug_handler]
pub async fn provider_availability(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(provider_id): Path<Uuid>,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let Query(query) = query?;
    let slots = state
        .availability
        .available(provider_id, query.date.as_deref())
        .await?;

    Ok(Json(slots))
}
