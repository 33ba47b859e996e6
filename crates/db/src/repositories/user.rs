use appointly_core::models::User;
use appointly_core::repositories::UserDirectory;
use async_trait::async_trait;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::DbPool;
use crate::models::DbUser;

pub async fn create_user(
    pool: &Pool<Postgres>,
    name: &str,
    email: &str,
    is_provider: bool,
) -> Result<DbUser> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, name, email, is_provider)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, is_provider, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(is_provider)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, name, email, is_provider, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Read-only view of the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: DbPool,
}

impl PgUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(get_user_by_id(&self.pool, id).await?.map(User::from))
    }
}
