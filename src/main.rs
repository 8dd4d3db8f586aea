//! Service entry point: runs the periodic booking maintenance sweeps
//! (stale-pending expiry and elapsed-booking completion) against the
//! configured database.

use dormhub::{
    config::{database, settings},
    core::sweep,
    errors::Result,
    external::TracingPublisher,
};
use dotenvy::dotenv;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = settings::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Initialize database and ensure tables exist
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Run the maintenance sweep loop
    let publisher = TracingPublisher;
    let expiry_window = chrono::Duration::hours(app_config.pending_expiry_hours);
    let mut ticker = tokio::time::interval(Duration::from_secs(app_config.sweep_interval_secs));
    info!(
        interval_secs = app_config.sweep_interval_secs,
        expiry_hours = app_config.pending_expiry_hours,
        "Starting booking maintenance sweep loop."
    );

    loop {
        ticker.tick().await;

        match sweep::expire_stale_pending(&db, &publisher, expiry_window).await {
            Ok(expired) if expired > 0 => info!(expired, "Expired stale pending bookings."),
            Ok(_) => {}
            Err(e) => error!("Stale booking sweep failed: {e}"),
        }

        match sweep::complete_elapsed(&db, &publisher).await {
            Ok(completed) if completed > 0 => info!(completed, "Completed elapsed bookings."),
            Ok(_) => {}
            Err(e) => error!("Completion sweep failed: {e}"),
        }
    }
}
