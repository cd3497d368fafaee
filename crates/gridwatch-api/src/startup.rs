//! Spawns the API server next to the simulation loop.

use std::future::Future;
use std::sync::Arc;

use gridwatch_core::store::GridStore;
use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Bind the listener, then serve on a background Tokio task.
///
/// Binding happens before the task is spawned, so an unusable address
/// is reported to the caller instead of being logged from the task.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound.
pub async fn spawn_api<S, F>(
    config: &ServerConfig,
    state: Arc<AppState<S>>,
    shutdown: F,
) -> Result<JoinHandle<()>, ServerError>
where
    S: GridStore,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = server::bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "API server exited with error");
        }
    });

    tracing::info!(port = config.port, "API server spawned on background task");
    Ok(handle)
}
