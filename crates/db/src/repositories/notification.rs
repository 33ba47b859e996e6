use appointly_core::models::Notification;
use appointly_core::repositories::NotificationStore;
use async_trait::async_trait;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::DbPool;
use crate::models::DbNotification;

pub async fn create_notification(
    pool: &Pool<Postgres>,
    recipient_id: Uuid,
    content: &str,
) -> Result<DbNotification> {
    let notification = sqlx::query_as::<_, DbNotification>(
        r#"
        INSERT INTO notifications (id, recipient_id, content, read)
        VALUES ($1, $2, $3, FALSE)
        RETURNING id, recipient_id, content, read, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(recipient_id)
    .bind(content)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

pub async fn get_notifications_for_user(
    pool: &Pool<Postgres>,
    recipient_id: Uuid,
    limit: i64,
) -> Result<Vec<DbNotification>> {
    let notifications = sqlx::query_as::<_, DbNotification>(
        r#"
        SELECT id, recipient_id, content, read, created_at
        FROM notifications
        WHERE recipient_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(recipient_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

pub async fn mark_notification_read(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbNotification>> {
    let notification = sqlx::query_as::<_, DbNotification>(
        r#"
        UPDATE notifications
        SET read = TRUE
        WHERE id = $1
        RETURNING id, recipient_id, content, read, created_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(notification)
}

#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, recipient_id: Uuid, content: &str) -> Result<Notification> {
        Ok(create_notification(&self.pool, recipient_id, content).await?.into())
    }

    async fn list_for_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<Notification>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = get_notifications_for_user(&self.pool, user_id, limit).await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>> {
        Ok(mark_notification_read(&self.pool, id).await?.map(Notification::from))
    }
}

// Run with `cargo test -p appointly-db -- --ignored` against TEST_DATABASE_URL.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::create_test_pool;
    use crate::repositories::user::create_user;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    #[ignore]
    async fn inbox_lists_newest_first_and_marks_read() {
        let pool = create_test_pool().await;
        let store = PgNotificationStore::new(pool.clone());
        let provider = create_user(&pool, "Provider", &format!("inbox-{}@example.com", Uuid::new_v4()), true)
            .await
            .unwrap();

        let older = store.create(provider.id, "First booking").await.unwrap();
        let newer = store.create(provider.id, "Second booking").await.unwrap();

        let inbox = store.list_for_user(provider.id, 20).await.unwrap();
        let ids: Vec<Uuid> = inbox.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert!(inbox.iter().all(|n| !n.read));
        assert_eq!(store.list_for_user(provider.id, 1).await.unwrap().len(), 1);

        let read = store.mark_read(older.id).await.unwrap().unwrap();
        assert!(read.read);
        assert!(store.mark_read(Uuid::new_v4()).await.unwrap().is_none());
    }
}
