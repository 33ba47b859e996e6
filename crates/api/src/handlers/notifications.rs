use axum::{
    Json,
    extract::{Path, State},
};
use appointly_core::models::Notification;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError},
};

/// `GET /notifications`: the caller's 20 newest notifications. Providers only.
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = state.notifications.list_for_provider(user.id()).await?;

    Ok(Json(notifications))
}

/// `PUT /notifications/:id`: marks one notification read.
#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<Arc<ApiState>>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = state.notifications.mark_read(id).await?;

    Ok(Json(notification))
}
