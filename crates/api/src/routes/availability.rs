use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/providers/:provider_id/available",
        get(handlers::availability::provider_availability),
    )
}
