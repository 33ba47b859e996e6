use std::sync::Arc;

use appointly_api::{ApiState, config::ApiConfig};
use appointly_core::clock::SystemClock;
use appointly_core::jobs;
use appointly_core::mail::LogMailer;
use appointly_core::queue::NotificationQueue;
use appointly_db::{
    PgAppointmentStore, PgJobBackend, PgNotificationStore, PgUserDirectory, create_pool,
    schema::initialize_database,
};
use color_eyre::eyre::Result;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    // The API only enqueues; appointly-worker consumes.
    let mut queue = NotificationQueue::new(Arc::new(PgJobBackend::new(db_pool.clone())));
    jobs::register_all(&mut queue, Arc::new(LogMailer::new(config.mail_from.clone())))?;

    let state = ApiState::new(
        Arc::new(PgAppointmentStore::new(db_pool.clone())),
        Arc::new(PgUserDirectory::new(db_pool.clone())),
        Arc::new(PgNotificationStore::new(db_pool)),
        Arc::new(queue),
        Arc::new(SystemClock),
    );

    appointly_api::start_server(config, Arc::new(state)).await?;

    Ok(())
}
