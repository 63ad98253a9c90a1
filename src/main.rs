//! launchpad-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints,
//! restores the ledger from the configured snapshot store, and saves a
//! final snapshot on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use launchpad_gateway::config::GatewayConfig;
use launchpad_gateway::persistence::{self, SnapshotBackend};
use launchpad_gateway::{build_app, build_state};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_json);
    tracing::info!(addr = %config.listen_addr, "starting launchpad-gateway");

    // Build domain and service layers
    let ledger_config = config
        .market
        .ledger_config()
        .context("validating market configuration")?;
    tracing::info!(
        shape = ledger_config.curve.shape().name(),
        curve_supply = %ledger_config.curve.curve_supply(),
        threshold = %ledger_config.migration_threshold,
        "market configured"
    );
    let app_state = build_state(ledger_config, config.event_bus_capacity);
    let ledger = Arc::clone(app_state.launch_service.ledger());

    // Restore state and start periodic snapshots
    let store = SnapshotBackend::from_config(&config.snapshot)
        .await
        .context("opening snapshot store")?
        .map(Arc::new);
    let snapshot_task = match &store {
        Some(store) => {
            persistence::restore_latest(store.as_ref(), &ledger)
                .await
                .context("restoring ledger snapshot")?;
            Some(persistence::spawn_snapshot_task(
                Arc::clone(store),
                Arc::clone(&ledger),
                Duration::from_secs(config.snapshot.interval_secs),
                config.snapshot.retention_days,
            ))
        }
        None => None,
    };

    // Start server
    let app = build_app(app_state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    // Final snapshot
    if let Some(task) = snapshot_task {
        task.abort();
    }
    if let Some(store) = &store {
        let count = persistence::persist(store.as_ref(), &ledger)
            .await
            .context("saving final snapshot")?;
        tracing::info!(launches = count, backend = store.name(), "final snapshot saved");
    }

    Ok(())
}
