use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{AgendaError, AgendaResult};
use crate::models::Notification;
use crate::models::notification::NOTIFICATION_LIST_LIMIT;
use crate::repositories::{NotificationStore, UserDirectory};

/// Provider-facing view of the notification store.
pub struct NotificationService {
    notifications: Arc<dyn NotificationStore>,
    users: Arc<dyn UserDirectory>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { notifications, users }
    }

    pub async fn list_for_provider(&self, user_id: Uuid) -> AgendaResult<Vec<Notification>> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .filter(|user| user.is_provider)
            .ok_or(AgendaError::NotAProvider)?;

        Ok(self.notifications.list_for_user(user_id, NOTIFICATION_LIST_LIMIT).await?)
    }

    /// Who may mark a notification read is decided by the authorization layer.
    pub async fn mark_read(&self, id: Uuid) -> AgendaResult<Notification> {
        self.notifications
            .mark_read(id)
            .await?
            .ok_or(AgendaError::NotificationNotFound)
    }
}
