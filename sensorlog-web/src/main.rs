//! sensorlog - sensor data logging web service
//!
//! Serves recorded readings over HTTP and streams live samples from the
//! configured sensor over a WebSocket at `/live`.

use anyhow::{Context, Result};
use clap::Parser;
use sensorlog_web::config::Args;
use sensorlog_web::{build_id, build_router, init_state, sensor};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before config or database delays
    info!("Starting sensorlog {}", build_id());

    let settings = Args::parse()
        .resolve()
        .context("Failed to load configuration")?;

    let span = info_span!("service", service = %settings.logger);
    run(settings).instrument(span).await
}

async fn run(settings: sensorlog_common::Settings) -> Result<()> {
    info!("Database: {} (table {})", settings.database_path.display(), settings.table);

    let state = init_state(settings)
        .await
        .context("Failed to initialize database")?;

    sensor::check_at_startup(state.sensor.as_ref()).context("Sensor check failed")?;

    let bind_addr = state.settings.bind_addr.clone();
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("sensorlog listening on http://{}", bind_addr);
    info!("Health check: http://{}/check", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("sensorlog stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then end all live sessions
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }

    // Open WebSocket connections would otherwise hold graceful shutdown forever
    shutdown.cancel();
}
