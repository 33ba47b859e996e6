use axum::http::{Method, StatusCode};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::test_utils::{TestContext, send};

#[tokio::test]
async fn test_provider_schedule() {
    let ctx = TestContext::new().await;
    for hour in [16, 9] {
        send(
            ctx.router(),
            Method::POST,
            "/appointments",
            Some(ctx.client.id),
            Some(json!({
                "provider_id": ctx.provider.id,
                "date": Utc.with_ymd_and_hms(2030, 6, 10, hour, 0, 0).unwrap().to_rfc3339(),
            })),
        )
        .await;
    }

    let (status, body) = send(
        ctx.router(),
        Method::GET,
        "/schedule?date=2030-06-10",
        Some(ctx.provider.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let hours: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["date"].as_str().unwrap().parse::<chrono::DateTime<Utc>>().unwrap())
        .collect();
    assert_eq!(
        hours,
        vec![
            Utc.with_ymd_and_hms(2030, 6, 10, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2030, 6, 10, 16, 0, 0).unwrap(),
        ]
    );
}

#[tokio::test]
async fn test_provider_schedule_rejects_clients() {
    let ctx = TestContext::new().await;

    let (status, body) = send(
        ctx.router(),
        Method::GET,
        "/schedule?date=2030-06-10",
        Some(ctx.client.id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "not_a_provider");
}
