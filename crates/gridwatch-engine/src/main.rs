//! Service binary for Gridwatch.
//!
//! Wires the `PostgreSQL` store, the tick engine and the dashboard API
//! together and runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `gridwatch.yaml` (or `$GRIDWATCH_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and run migrations; failure is fatal
//! 4. Seed the line registry if it is empty
//! 5. Start the dashboard API server
//! 6. Run the simulation loop until shutdown
//! 7. Drain the API server and close the pool

mod error;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use gridwatch_api::{AppState, ServerConfig};
use gridwatch_core::config::GridwatchConfig;
use gridwatch_core::engine::SimulationEngine;
use gridwatch_core::monitor::SimulationMonitor;
use gridwatch_core::runner::{self, RunOptions};
use gridwatch_core::seed::seed_lines;
use gridwatch_db::PgStore;
use tokio::sync::watch;
use tracing::{error, info};

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "gridwatch.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config(&config_path())?;

    // 2. Initialize structured logging.
    logging::init(&config.logging);
    info!("gridwatch-engine starting");
    info!(
        port = config.server.port,
        tick_interval_ms = config.simulation.tick_interval_ms,
        fault_probability = config.simulation.fault_probability,
        recovery_probability = config.simulation.recovery_probability,
        seed = config.simulation.seed,
        "Configuration loaded"
    );

    // 3. Connect to PostgreSQL.
    let store = PgStore::connect(&config.database)
        .await
        .map_err(EngineError::from)?;
    store.migrate().await.map_err(EngineError::from)?;

    // 4. Seed the registry.
    let seeded = seed_lines(&store, &config.seed_lines)
        .await
        .map_err(EngineError::from)?;
    info!(seeded, "Line registry ready");

    // 5. Start the API server.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = Arc::new(SimulationMonitor::new());
    let app_state = Arc::new(
        AppState::from_config(store.clone(), &config, Arc::clone(&monitor))
            .map_err(EngineError::from)?,
    );
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let api_handle = gridwatch_api::spawn_api(
        &server_config,
        app_state,
        wait_for_shutdown(shutdown_rx.clone()),
    )
    .await
    .map_err(EngineError::from)?;

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
        }
        let _ = shutdown_tx.send(true);
    });

    // 6. Run the simulation.
    let mut engine =
        SimulationEngine::from_config(store.clone(), store.clone(), &config.simulation);
    let options = RunOptions::every(Duration::from_millis(config.simulation.tick_interval_ms));
    let result =
        runner::run_simulation(&mut engine, &monitor, options, wait_for_shutdown(shutdown_rx))
            .await;
    runner::log_simulation_end(&result);

    // 7. Drain and close.
    if let Err(e) = api_handle.await {
        error!(error = %e, "API server task failed");
    }
    store.close().await;

    info!(
        total_ticks = result.total_ticks,
        "gridwatch-engine shutdown complete"
    );
    Ok(())
}

/// The configuration file to load: `$GRIDWATCH_CONFIG` if set, else
/// `gridwatch.yaml` in the working directory.
fn config_path() -> PathBuf {
    std::env::var_os("GRIDWATCH_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration from `path`, falling back to defaults plus
/// environment overrides when the file does not exist.
fn load_config(path: &Path) -> Result<GridwatchConfig, EngineError> {
    if path.exists() {
        Ok(GridwatchConfig::from_file(path)?)
    } else {
        Ok(GridwatchConfig::from_env()?)
    }
}

/// Resolve once the shutdown flag flips, or its sender is dropped.
async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
