use appointly_core::models::{Appointment, JobStatus, Notification, QueuedJob, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_provider: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            is_provider: row.is_provider,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub client_id: Uuid,
    pub provider_id: Uuid,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<DbAppointment> for Appointment {
    fn from(row: DbAppointment) -> Self {
        Appointment {
            id: row.id,
            date: row.date,
            client_id: row.client_id,
            provider_id: row.provider_id,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbNotification> for Notification {
    fn from(row: DbNotification) -> Self {
        Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            content: row.content,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbJob {
    pub id: Uuid,
    pub type_key: String,
    pub payload: Value,
    pub status: String,
    pub attempts: i32,
    pub run_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TryFrom<DbJob> for QueuedJob {
    type Error = eyre::Report;

    fn try_from(row: DbJob) -> eyre::Result<Self> {
        let status = JobStatus::parse(&row.status)
            .ok_or_else(|| eyre::eyre!("Job {} has unknown status '{}'", row.id, row.status))?;

        Ok(QueuedJob {
            id: row.id,
            type_key: row.type_key,
            payload: row.payload,
            status,
            attempts: u32::try_from(row.attempts).unwrap_or_default(),
            run_at: row.run_at,
            locked_at: row.locked_at,
            last_error: row.last_error,
            created_at: row.created_at,
        })
    }
}
