use actix_web::{App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use saigon_steps_admin::api::{self, AppState};
use saigon_steps_admin::config::AppConfig;
use saigon_steps_admin::domain::order_status::StatusCatalog;
use saigon_steps_admin::domain::staff::{Role, StaffMember};
use saigon_steps_admin::live::LiveChannel;
use saigon_steps_admin::metrics::Metrics;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,saigon_steps_admin=debug"))
        )
        .init();

    tracing::info!("🚀 Starting Saigon Steps admin service");

    // === 1. Configuration ===
    let config = AppConfig::load()?;

    // === 2. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Status catalog ===
    let catalog = if config.catalog.seed_defaults {
        StatusCatalog::seeded()?
    } else {
        StatusCatalog::new()
    };
    tracing::info!(
        statuses = catalog.list_statuses().len(),
        transitions = catalog.table().len(),
        "Order status catalog ready"
    );

    // === 4. Shared state and bootstrap administrator ===
    let live = LiveChannel::new(config.live.channel_capacity);
    let state = AppState::new(catalog, live, metrics);

    let admin = state
        .staff
        .register(
            StaffMember::new(config.bootstrap.admin_name.clone(), config.bootstrap.admin_email.clone()),
            Role::administrator(),
        )
        .await;
    tracing::info!(staff_id = %admin.id, "Bootstrap administrator registered, send it as {}", api::STAFF_HEADER);

    // === 5. HTTP server ===
    let (host, port) = config.bind_address();
    tracing::info!("🌐 Listening on http://{}:{}", host, port);

    HttpServer::new(move || App::new().configure(api::configure(state.clone())))
        .bind((host, port))?
        .run()
        .await?;

    tracing::info!("👋 Shutdown complete");
    Ok(())
}
