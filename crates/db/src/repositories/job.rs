use appointly_core::models::{JobHandle, QueuedJob};
use appointly_core::queue::{FailureDisposition, JobBackend, RetryPolicy};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use eyre::Result;
use serde_json::Value;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::DbPool;
use crate::models::DbJob;

const JOB_COLUMNS: &str =
    "id, type_key, payload, status, attempts, run_at, locked_at, last_error, created_at, finished_at";

pub async fn create_job(pool: &Pool<Postgres>, type_key: &str, payload: &Value) -> Result<DbJob> {
    let job = sqlx::query_as::<_, DbJob>(&format!(
        r#"
        INSERT INTO jobs (id, type_key, payload, status, attempts, run_at)
        VALUES ($1, $2, $3, 'pending', 0, NOW())
        RETURNING {JOB_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(type_key)
    .bind(payload)
    .fetch_one(pool)
    .await?;

    Ok(job)
}

/// Claims the oldest ready job of `type_key` and counts the attempt.
///
/// Concurrent workers skip rows another transaction has locked, so a job is
/// handed to one worker at a time. A `running` job whose lease is older than
/// `lease_seconds` is considered abandoned and claimed again.
pub async fn reserve_job(pool: &Pool<Postgres>, type_key: &str, lease_seconds: f64) -> Result<Option<DbJob>> {
    let job = sqlx::query_as::<_, DbJob>(&format!(
        r#"
        UPDATE jobs
        SET status = 'running', locked_at = NOW(), attempts = attempts + 1
        WHERE id = (
            SELECT id
            FROM jobs
            WHERE type_key = $1
              AND (
                (status = 'pending' AND run_at <= NOW())
                OR (status = 'running' AND locked_at < NOW() - make_interval(secs => $2))
              )
            ORDER BY run_at ASC
            LIMIT 1
            FOR UPDATE SKIP LOCKED
        )
        RETURNING {JOB_COLUMNS}
        "#
    ))
    .bind(type_key)
    .bind(lease_seconds)
    .fetch_optional(pool)
    .await?;

    Ok(job)
}

pub async fn complete_job(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET status = 'completed', locked_at = NULL, finished_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn reschedule_job(pool: &Pool<Postgres>, id: Uuid, run_at: DateTime<Utc>, error: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET status = 'pending', locked_at = NULL, run_at = $2, last_error = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(run_at)
    .bind(error)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn fail_job(pool: &Pool<Postgres>, id: Uuid, error: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET status = 'failed', locked_at = NULL, last_error = $2, finished_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(error)
    .execute(pool)
    .await?;

    Ok(())
}

/// Job queue storage on the `jobs` table.
#[derive(Debug, Clone)]
pub struct PgJobBackend {
    pool: DbPool,
    retry_policy: RetryPolicy,
    lease: Duration,
}

impl PgJobBackend {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            retry_policy: RetryPolicy::default(),
            lease: Duration::minutes(5),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }
}

#[async_trait]
impl JobBackend for PgJobBackend {
    async fn push(&self, type_key: &str, payload: Value) -> Result<JobHandle> {
        let row = create_job(&self.pool, type_key, &payload).await?;
        debug!("Stored job: id={}, type={}", row.id, row.type_key);
        Ok(JobHandle {
            id: row.id,
            type_key: row.type_key,
        })
    }

    async fn reserve(&self, type_key: &str) -> Result<Option<QueuedJob>> {
        let lease_seconds = self.lease.num_milliseconds() as f64 / 1000.0;
        reserve_job(&self.pool, type_key, lease_seconds)
            .await?
            .map(QueuedJob::try_from)
            .transpose()
    }

    async fn complete(&self, job_id: Uuid) -> Result<()> {
        complete_job(&self.pool, job_id).await
    }

    async fn fail(&self, job: &QueuedJob, error: &str) -> Result<FailureDisposition> {
        let disposition = self.retry_policy.disposition(job.attempts, Utc::now());
        match disposition {
            FailureDisposition::Retrying { retry_at, .. } => {
                reschedule_job(&self.pool, job.id, retry_at, error).await?
            }
            FailureDisposition::Exhausted { .. } => fail_job(&self.pool, job.id, error).await?,
        }
        Ok(disposition)
    }
}
