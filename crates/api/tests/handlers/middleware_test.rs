use appointly_api::middleware::error_handling::{AppError, map_error};
use appointly_core::errors::AgendaError;
use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::test_utils::{TestContext, send};

#[rstest]
#[case::invalid_input(AgendaError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST)]
#[case::self_booking(AgendaError::SelfBookingNotAllowed, StatusCode::BAD_REQUEST)]
#[case::past_date(AgendaError::PastDateRejected, StatusCode::BAD_REQUEST)]
#[case::window(AgendaError::CancellationWindowExpired, StatusCode::BAD_REQUEST)]
#[case::not_a_provider(AgendaError::NotAProvider, StatusCode::BAD_REQUEST)]
#[case::unauthenticated(AgendaError::Unauthenticated, StatusCode::UNAUTHORIZED)]
#[case::not_authorized(AgendaError::NotAuthorized, StatusCode::FORBIDDEN)]
#[case::provider_not_found(AgendaError::ProviderNotFound, StatusCode::NOT_FOUND)]
#[case::appointment_not_found(AgendaError::AppointmentNotFound, StatusCode::NOT_FOUND)]
#[case::notification_not_found(AgendaError::NotificationNotFound, StatusCode::NOT_FOUND)]
#[case::slot_taken(AgendaError::SlotAlreadyBooked, StatusCode::CONFLICT)]
#[case::already_cancelled(AgendaError::AlreadyCancelled, StatusCode::CONFLICT)]
#[case::unknown_job(AgendaError::UnknownJobType("x".into()), StatusCode::INTERNAL_SERVER_ERROR)]
#[case::database(AgendaError::Database(eyre::eyre!("down")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: AgendaError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).status(), expected);
}

#[tokio::test]
async fn test_error_handling_internal() {
    let error = AgendaError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_malformed_caller_identity() {
    let ctx = TestContext::new().await;

    let request = axum::http::Request::builder()
        .uri("/appointments")
        .header("X-User-Id", "user-42")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(ctx.router(), request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new().await;

    let (status, body) = send(ctx.router(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(ctx.router(), Method::GET, "/version", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "appointly-api");
}
