//! ASV Dashboard Server
//!
//! Backend for the dashboard: login, admin state, route files, gallery and
//! the live sensor stream.

use anyhow::{Context, Result};
use asv_sensors::SimulatedSensor;
use asv_server::{api, config::ServerConfig, manager, state, storage};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting ASV Dashboard Server");

    let config = ServerConfig::from_env();
    storage::prepare_dirs(&config).with_context(|| {
        format!("creating data directories under {}", config.data_dir().display())
    })?;
    info!("Data directory: {}", config.data_dir().display());
    let addr = config.bind;

    // Create application state
    let state = state::AppState::new(config);

    // Build the router
    let app = api::create_router(state.clone());

    // Start sensor loop in background
    let cancel = CancellationToken::new();
    let sensor = tokio::spawn(manager::run(
        state.clone(),
        Box::new(SimulatedSensor::new()),
        manager::SAMPLE_INTERVAL,
        cancel.clone(),
    ));

    // Start server
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    cancel.cancel();
    sensor.await?;
    Ok(())
}
