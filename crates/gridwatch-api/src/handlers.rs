//! Read-only dashboard endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/data/dashboard` | Overview figures |
//! | `GET` | `/api/data/live-monitor` | All lines, name ascending |
//! | `GET` | `/api/data/analytics` | Recently resolved alerts (`?limit=`) |
//! | `GET` | `/api/data/alerts` | Active alerts, newest first |
//! | `GET` | `/api/data/settings` | Placeholder settings |
//! | `GET` | `/api/data/system-status` | API, store and simulation health |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use gridwatch_core::query;
use gridwatch_core::store::GridStore;
use gridwatch_types::{Alert, DashboardSummary, Line, SystemHealth, SystemSettings};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /api/data/analytics`.
#[derive(Debug, serde::Deserialize)]
pub struct AnalyticsQuery {
    /// Number of resolved alerts to return, clamped to `1..=100`.
    pub limit: Option<u32>,
}

/// Overview figures for the dashboard cards.
pub async fn dashboard<S: GridStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(query::dashboard(&state.store).await?))
}

/// Every line with its latest telemetry.
pub async fn live_monitor<S: GridStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Line>>, ApiError> {
    Ok(Json(query::live_monitor(&state.store).await?))
}

/// Most recently resolved alerts, newest resolution first.
pub async fn analytics<S: GridStore>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = query::clamp_history_limit(params.limit, state.analytics_limit);
    Ok(Json(query::resolved_history(&state.store, limit).await?))
}

/// Alerts that are still open.
pub async fn active_alerts<S: GridStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    Ok(Json(query::active_alerts(&state.store).await?))
}

/// Static settings placeholder.
pub async fn settings<S: GridStore>(State(state): State<Arc<AppState<S>>>) -> Json<SystemSettings> {
    Json(state.settings.clone())
}

/// Health of the API, the store and the simulation loop.
///
/// Always answers 200; a failed store probe is reported in the body.
pub async fn system_status<S: GridStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<SystemHealth> {
    let db_status = match state.store.ping().await {
        Ok(()) => "Connected",
        Err(e) => {
            tracing::warn!(error = %e, "Store probe failed");
            "Disconnected"
        }
    };

    Json(SystemHealth {
        api_status: String::from("Online"),
        db_status: String::from(db_status),
        simulation_status: String::from(state.monitor.status_label()),
        ticks_completed: state.monitor.ticks_completed(),
        last_tick_at: state.monitor.last_tick_at(),
    })
}
