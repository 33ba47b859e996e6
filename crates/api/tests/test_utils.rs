#![allow(dead_code)]

use std::sync::Arc;

use appointly_api::{ApiState, build_router};
use appointly_core::clock::ManualClock;
use appointly_core::jobs;
use appointly_core::mail::LogMailer;
use appointly_core::memory::{
    InMemoryAppointmentStore, InMemoryJobBackend, InMemoryNotificationStore, InMemoryUserDirectory,
};
use appointly_core::models::User;
use appointly_core::queue::NotificationQueue;
use appointly_core::repositories::{AppointmentStore, NotificationStore, UserDirectory};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

/// Sunday 2030-06-09 12:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 9, 12, 0, 0).unwrap()
}

pub fn user(name: &str, is_provider: bool) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        is_provider,
    }
}

/// In-memory ports behind the real router.
pub struct TestContext {
    pub clock: Arc<ManualClock>,
    pub appointments: Arc<InMemoryAppointmentStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub notifications: Arc<InMemoryNotificationStore>,
    pub jobs: Arc<InMemoryJobBackend>,
    pub client: User,
    pub provider: User,
}

impl TestContext {
    pub async fn new() -> Self {
        let users = Arc::new(InMemoryUserDirectory::new());
        let client = user("Carla Client", false);
        let provider = user("Pat Provider", true);
        users.insert(client.clone()).await;
        users.insert(provider.clone()).await;

        Self {
            clock: Arc::new(ManualClock::new(now())),
            appointments: Arc::new(InMemoryAppointmentStore::new()),
            users,
            notifications: Arc::new(InMemoryNotificationStore::new()),
            jobs: Arc::new(InMemoryJobBackend::default()),
            client,
            provider,
        }
    }

    pub fn router(&self) -> Router {
        self.router_with(
            self.appointments.clone(),
            self.users.clone(),
            self.notifications.clone(),
        )
    }

    /// Router over the given ports, sharing this context's clock and job backend.
    pub fn router_with(
        &self,
        appointments: Arc<dyn AppointmentStore>,
        users: Arc<dyn UserDirectory>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Router {
        let mut queue = NotificationQueue::new(self.jobs.clone());
        jobs::register_all(&mut queue, Arc::new(LogMailer::new("test@appointly.local"))).unwrap();

        build_router(Arc::new(ApiState::new(
            appointments,
            users,
            notifications,
            Arc::new(queue),
            self.clock.clone(),
        )))
    }
}

/// Sends one request through `router` and returns the status and JSON body.
pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    caller: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        request = request.header("X-User-Id", caller.to_string());
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
