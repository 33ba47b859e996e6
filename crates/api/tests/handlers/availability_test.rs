use axum::http::{Method, StatusCode};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::test_utils::{TestContext, send};

#[tokio::test]
async fn test_provider_availability() {
    let ctx = TestContext::new().await;
    send(
        ctx.router(),
        Method::POST,
        "/appointments",
        Some(ctx.client.id),
        Some(json!({
            "provider_id": ctx.provider.id,
            "date": Utc.with_ymd_and_hms(2030, 6, 10, 14, 0, 0).unwrap().to_rfc3339(),
        })),
    )
    .await;

    let uri = format!("/providers/{}/available?date=2030-06-10", ctx.provider.id);
    let (status, body) = send(ctx.router(), Method::GET, &uri, Some(ctx.client.id), None).await;

    assert_eq!(status, StatusCode::OK);
    let slots = body.as_array().unwrap();
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[0]["time"], "08:00");
    let closed: Vec<_> = slots
        .iter()
        .filter(|slot| slot["available"] == false)
        .map(|slot| slot["time"].as_str().unwrap())
        .collect();
    assert_eq!(closed, vec!["14:00"]);
}

#[tokio::test]
async fn test_provider_availability_accepts_epoch_millis() {
    let ctx = TestContext::new().await;
    let millis = Utc.with_ymd_and_hms(2030, 6, 10, 0, 0, 0).unwrap().timestamp_millis();

    let uri = format!("/providers/{}/available?date={millis}", ctx.provider.id);
    let (status, body) = send(ctx.router(), Method::GET, &uri, Some(ctx.client.id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_provider_availability_requires_a_date() {
    let ctx = TestContext::new().await;

    for query in ["", "?date=", "?date=someday"] {
        let uri = format!("/providers/{}/available{query}", ctx.provider.id);
        let (status, body) = send(ctx.router(), Method::GET, &uri, Some(ctx.client.id), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query:?} was accepted");
        assert_eq!(body["error"]["code"], "invalid_input");
    }
}
