#![allow(dead_code)]

use std::sync::Arc;

use appointly_core::clock::ManualClock;
use appointly_core::jobs;
use appointly_core::mail::LogMailer;
use appointly_core::memory::{
    InMemoryAppointmentStore, InMemoryJobBackend, InMemoryNotificationStore, InMemoryUserDirectory,
};
use appointly_core::models::User;
use appointly_core::queue::NotificationQueue;
use appointly_core::services::{CancellationPolicy, SchedulingService};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// "Now" for every fixture: Sunday 2030-06-09 12:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 9, 12, 0, 0).unwrap()
}

/// An hour on the day after [`now`].
pub fn tomorrow_at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 10, hour, 0, 0).unwrap()
}

pub fn user(name: &str, is_provider: bool) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        is_provider,
    }
}

pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub appointments: Arc<InMemoryAppointmentStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub notifications: Arc<InMemoryNotificationStore>,
    pub jobs: Arc<InMemoryJobBackend>,
    pub queue: Arc<NotificationQueue>,
    pub client: User,
    pub provider: User,
}

impl Fixture {
    pub async fn new() -> Self {
        let clock = Arc::new(ManualClock::new(now()));
        let users = Arc::new(InMemoryUserDirectory::new());
        let client = user("Carla Client", false);
        let provider = user("Pat Provider", true);
        users.insert(client.clone()).await;
        users.insert(provider.clone()).await;

        let jobs = Arc::new(InMemoryJobBackend::default());
        let mut queue = NotificationQueue::new(jobs.clone());
        jobs::register_all(&mut queue, Arc::new(LogMailer::new("test@appointly.local"))).unwrap();

        Self {
            clock,
            appointments: Arc::new(InMemoryAppointmentStore::new()),
            users,
            notifications: Arc::new(InMemoryNotificationStore::new()),
            jobs,
            queue: Arc::new(queue),
            client,
            provider,
        }
    }

    pub fn scheduling(&self) -> SchedulingService {
        SchedulingService::new(
            self.appointments.clone(),
            self.users.clone(),
            self.notifications.clone(),
            self.clock.clone(),
        )
    }

    pub fn cancellation(&self) -> CancellationPolicy {
        CancellationPolicy::new(
            self.appointments.clone(),
            self.users.clone(),
            self.queue.clone(),
            self.clock.clone(),
        )
    }
}
