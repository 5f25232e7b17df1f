//! CalBridge server binary
//!
//! Wires the SQLite repositories and the Cal.com client into the
//! reconciliation and booking services, then serves the HTTP surface.

use std::sync::Arc;

use anyhow::Result;
use calbridge_core::{BookingService, ReconciliationService};
use calbridge_infra::{
    config, CalComClient, DbManager, SqliteAppointmentRepository, SqliteServiceMappingRepository,
};
use calbridge_server::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::load()?;

    let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
    db.run_migrations()?;

    let pool = Arc::new(db.pool().clone());
    let appointments = Arc::new(SqliteAppointmentRepository::new(pool.clone()));
    let mappings = Arc::new(SqliteServiceMappingRepository::new(pool));
    let provider = Arc::new(CalComClient::new(&config.provider)?);

    let reconciler =
        Arc::new(ReconciliationService::new(appointments.clone(), mappings.clone()));
    let bookings =
        Arc::new(BookingService::new(appointments, mappings.clone(), provider.clone()));

    if config.webhook.is_insecure() {
        // The loader only lets this through with the explicit opt-in flag;
        // still worth a loud line in the startup log.
        warn!("webhook signature verification is DISABLED; every delivery will be accepted");
    }

    let state = AppState {
        reconciler,
        bookings,
        provider,
        mappings,
        webhook: config.webhook.clone(),
        db: Some(db),
    };
    let app = calbridge_server::router(state);

    info!(
        addr = %config.server.bind_addr,
        db_path = %config.database.path,
        provider = %config.provider.base_url,
        timezone = %config.provider.default_timezone,
        "calbridge listening"
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
