use std::sync::Arc;

use appointly_core::errors::StoreError;
use appointly_db::mock::repositories::{MockAppointmentRepo, MockUserRepo};
use axum::http::{Method, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, send, user};

fn tomorrow_at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 10, hour, 0, 0).unwrap()
}

fn date_of(body: &Value) -> DateTime<Utc> {
    body["date"].as_str().unwrap().parse().unwrap()
}

async fn book(ctx: &TestContext, hour: u32) -> Value {
    let (status, body) = send(
        ctx.router(),
        Method::POST,
        "/appointments",
        Some(ctx.client.id),
        Some(json!({ "provider_id": ctx.provider.id, "date": tomorrow_at(hour).to_rfc3339() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "booking failed: {body}");
    body
}

#[tokio::test]
async fn test_create_appointment() {
    let ctx = TestContext::new().await;
    let requested = tomorrow_at(10) + Duration::minutes(45);

    let (status, body) = send(
        ctx.router(),
        Method::POST,
        "/appointments",
        Some(ctx.client.id),
        Some(json!({ "provider_id": ctx.provider.id, "date": requested.to_rfc3339() })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(date_of(&body), tomorrow_at(10));
    assert_eq!(body["client_id"], json!(ctx.client.id));
    assert_eq!(body["provider_id"], json!(ctx.provider.id));
    assert_eq!(body["cancelled_at"], Value::Null);
    assert!(body.get("warning").is_none());
    assert_eq!(ctx.appointments.all().await.len(), 1);
}

#[tokio::test]
async fn test_create_appointment_without_offset_is_utc() {
    let ctx = TestContext::new().await;

    let (status, body) = send(
        ctx.router(),
        Method::POST,
        "/appointments",
        Some(ctx.client.id),
        Some(json!({ "provider_id": ctx.provider.id, "date": "2030-06-10T14:20:00" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(date_of(&body), tomorrow_at(14));
}

#[tokio::test]
async fn test_create_appointment_requires_caller() {
    let ctx = TestContext::new().await;

    let (status, body) = send(
        ctx.router(),
        Method::POST,
        "/appointments",
        None,
        Some(json!({ "provider_id": ctx.provider.id, "date": tomorrow_at(10).to_rfc3339() })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthenticated");
}

#[tokio::test]
async fn test_create_appointment_validates_body() {
    let ctx = TestContext::new().await;

    for payload in [
        json!({ "date": tomorrow_at(10).to_rfc3339() }),
        json!({ "provider_id": ctx.provider.id }),
        json!({ "provider_id": ctx.provider.id, "date": "tomorrow at ten" }),
        json!({ "provider_id": "not-a-uuid", "date": tomorrow_at(10).to_rfc3339() }),
    ] {
        let (status, body) = send(
            ctx.router(),
            Method::POST,
            "/appointments",
            Some(ctx.client.id),
            Some(payload.clone()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload} was accepted");
        assert_eq!(body["error"]["code"], "invalid_input");
    }
    assert!(ctx.appointments.all().await.is_empty());
}

#[tokio::test]
async fn test_create_appointment_domain_errors() {
    let ctx = TestContext::new().await;
    book(&ctx, 10).await;

    let cases = [
        (ctx.client.id, Uuid::new_v4(), tomorrow_at(11), StatusCode::NOT_FOUND, "provider_not_found"),
        (ctx.provider.id, ctx.provider.id, tomorrow_at(11), StatusCode::BAD_REQUEST, "self_booking_not_allowed"),
        (ctx.client.id, ctx.provider.id, tomorrow_at(10) - Duration::days(2), StatusCode::BAD_REQUEST, "past_date_rejected"),
        (ctx.client.id, ctx.provider.id, tomorrow_at(10), StatusCode::CONFLICT, "slot_already_booked"),
    ];

    for (caller, provider_id, date, expected_status, expected_code) in cases {
        let (status, body) = send(
            ctx.router(),
            Method::POST,
            "/appointments",
            Some(caller),
            Some(json!({ "provider_id": provider_id, "date": date.to_rfc3339() })),
        )
        .await;

        assert_eq!(status, expected_status);
        assert_eq!(body["error"]["code"], expected_code);
    }
}

#[tokio::test]
async fn test_list_appointments() {
    let ctx = TestContext::new().await;
    book(&ctx, 15).await;
    book(&ctx, 9).await;

    let (status, body) = send(ctx.router(), Method::GET, "/appointments", Some(ctx.client.id), None).await;

    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(date_of(&listed[0]), tomorrow_at(9));
    assert_eq!(listed[0]["provider"]["name"], "Pat Provider");
    assert_eq!(listed[0]["past"], false);
    assert_eq!(listed[0]["cancelable"], true);

    let (_, second_page) = send(
        ctx.router(),
        Method::GET,
        "/appointments?page=2",
        Some(ctx.client.id),
        None,
    )
    .await;
    assert_eq!(second_page, json!([]));
}

#[tokio::test]
async fn test_cancel_appointment() {
    let ctx = TestContext::new().await;
    let booked = book(&ctx, 10).await;
    let uri = format!("/appointments/{}", booked["id"].as_str().unwrap());

    let (status, body) = send(ctx.router(), Method::DELETE, &uri, Some(ctx.client.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["cancelled_at"].is_string());
    assert_eq!(ctx.jobs.jobs().await.len(), 1);

    let (status, body) = send(ctx.router(), Method::DELETE, &uri, Some(ctx.client.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "already_cancelled");
    assert_eq!(ctx.jobs.jobs().await.len(), 1);
}

#[tokio::test]
async fn test_cancel_appointment_rules() {
    let ctx = TestContext::new().await;
    let stranger = user("Stan Stranger", false);
    ctx.users.insert(stranger.clone()).await;
    let booked = book(&ctx, 10).await;
    let uri = format!("/appointments/{}", booked["id"].as_str().unwrap());

    let (status, body) = send(ctx.router(), Method::DELETE, &uri, Some(stranger.id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "not_authorized");

    let (status, _) = send(
        ctx.router(),
        Method::DELETE,
        &format!("/appointments/{}", Uuid::new_v4()),
        Some(ctx.client.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.clock.set(tomorrow_at(9));
    let (status, body) = send(ctx.router(), Method::DELETE, &uri, Some(ctx.client.id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "cancellation_window_expired");
    assert!(ctx.jobs.jobs().await.is_empty());
}

#[tokio::test]
async fn test_lost_insert_race_is_a_conflict() {
    let ctx = TestContext::new().await;
    let mut appointments = MockAppointmentRepo::new();
    appointments
        .expect_find_active_for_provider_in_range()
        .returning(|_, _, _| Ok(Vec::new()));
    appointments
        .expect_insert_if_no_active_conflict()
        .times(1)
        .returning(|appointment| {
            Err(StoreError::Conflict {
                provider_id: appointment.provider_id,
                date: appointment.date,
            })
        });

    let router = ctx.router_with(Arc::new(appointments), ctx.users.clone(), ctx.notifications.clone());
    let (status, body) = send(
        router,
        Method::POST,
        "/appointments",
        Some(ctx.client.id),
        Some(json!({ "provider_id": ctx.provider.id, "date": tomorrow_at(10).to_rfc3339() })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "slot_already_booked");
}

#[tokio::test]
async fn test_storage_failure_is_hidden_from_the_client() {
    let ctx = TestContext::new().await;
    let mut users = MockUserRepo::new();
    users
        .expect_find_user_by_id()
        .returning(|_| Err(eyre::eyre!("connection refused: 10.0.0.5:5432")));

    let router = ctx.router_with(ctx.appointments.clone(), Arc::new(users), ctx.notifications.clone());
    let (status, body) = send(
        router,
        Method::POST,
        "/appointments",
        Some(ctx.client.id),
        Some(json!({ "provider_id": ctx.provider.id, "date": tomorrow_at(10).to_rfc3339() })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": { "code": "database_error", "message": "Internal server error" } })
    );
}
