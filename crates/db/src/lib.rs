//! PostgreSQL persistence for Appointly.
//!
//! Repository functions take a pool and speak in `Db*` rows; the `Pg*` types
//! wrap them to implement the ports declared in `appointly_core`.

pub mod models;
pub mod repositories;
pub mod schema;

pub mod mock;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub use repositories::{PgAppointmentStore, PgJobBackend, PgNotificationStore, PgUserDirectory};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
