use appointly_core::errors::StoreError;
use appointly_core::models::{Appointment, Notification, User};
use appointly_core::repositories::{AppointmentStore, NotificationStore, UserDirectory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use uuid::Uuid;

// Mock ports for testing callers without a database
mock! {
    pub AppointmentRepo {}

    #[async_trait]
    impl AppointmentStore for AppointmentRepo {
        async fn insert_if_no_active_conflict(
            &self,
            appointment: Appointment,
        ) -> Result<Appointment, StoreError>;

        async fn find_by_id(&self, id: Uuid) -> eyre::Result<Option<Appointment>>;

        async fn find_active_for_provider_in_range(
            &self,
            provider_id: Uuid,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> eyre::Result<Vec<Appointment>>;

        async fn list_active_for_user(
            &self,
            user_id: Uuid,
            page: u32,
            page_size: u32,
        ) -> eyre::Result<Vec<Appointment>>;

        async fn update(&self, appointment: &Appointment) -> eyre::Result<Appointment>;

        async fn mark_cancelled(
            &self,
            id: Uuid,
            cancelled_at: DateTime<Utc>,
        ) -> eyre::Result<Option<Appointment>>;
    }
}

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserDirectory for UserRepo {
        async fn find_user_by_id(&self, id: Uuid) -> eyre::Result<Option<User>>;
    }
}

mock! {
    pub NotificationRepo {}

    #[async_trait]
    impl NotificationStore for NotificationRepo {
        async fn create(&self, recipient_id: Uuid, content: &str) -> eyre::Result<Notification>;

        async fn list_for_user(
            &self,
            user_id: Uuid,
            limit: usize,
        ) -> eyre::Result<Vec<Notification>>;

        async fn mark_read(&self, id: Uuid) -> eyre::Result<Option<Notification>>;
    }
}
