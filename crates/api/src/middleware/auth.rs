//! # Caller Identity
//!
//! Authentication happens upstream. By the time a request reaches this
//! service the authenticating proxy has verified the caller and forwarded
//! their user id in the `X-User-Id` header; this module only reads it.

use appointly_core::errors::AgendaError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::error_handling::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
///
/// Handlers take this as an extractor; a missing or malformed header rejects
/// the request with `401 Unauthenticated` before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(CurrentUser)
            .ok_or(AppError(AgendaError::Unauthenticated))
    }
}
