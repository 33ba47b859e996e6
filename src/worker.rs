use color_eyre::eyre::Result;
use dotenv::dotenv;
use appointly_db::{create_pool, schema::initialize_database};
use appointly_worker::config::WorkerConfig;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = WorkerConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Appointly worker");

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    if let Err(e) = appointly_worker::start_worker(config, db_pool).await {
        error!("Worker error: {}", e);
        return Err(e);
    }

    info!("Worker shut down gracefully");
    Ok(())
}
