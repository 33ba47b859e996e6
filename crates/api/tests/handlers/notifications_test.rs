use axum::http::{Method, StatusCode};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{TestContext, send};

#[tokio::test]
async fn test_booking_notifies_provider() {
    let ctx = TestContext::new().await;
    send(
        ctx.router(),
        Method::POST,
        "/appointments",
        Some(ctx.client.id),
        Some(json!({
            "provider_id": ctx.provider.id,
            "date": Utc.with_ymd_and_hms(2030, 6, 10, 10, 0, 0).unwrap().to_rfc3339(),
        })),
    )
    .await;

    let (status, body) = send(ctx.router(), Method::GET, "/notifications", Some(ctx.provider.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let inbox = body.as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["content"], "New appointment with Carla Client on June 10, at 10:00");
    assert_eq!(inbox[0]["read"], false);

    let uri = format!("/notifications/{}", inbox[0]["id"].as_str().unwrap());
    let (status, body) = send(ctx.router(), Method::PUT, &uri, Some(ctx.provider.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["read"], true);
}

#[tokio::test]
async fn test_notifications_are_provider_only() {
    let ctx = TestContext::new().await;

    let (status, body) = send(ctx.router(), Method::GET, "/notifications", Some(ctx.client.id), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "not_a_provider");
}

#[tokio::test]
async fn test_mark_unknown_notification() {
    let ctx = TestContext::new().await;

    let uri = format!("/notifications/{}", Uuid::new_v4());
    let (status, body) = send(ctx.router(), Method::PUT, &uri, Some(ctx.provider.id), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "notification_not_found");
}
