//! Axum router construction for the dashboard API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use gridwatch_core::store::GridStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handlers};

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /api/data/dashboard`
/// - `GET /api/data/live-monitor`
/// - `GET /api/data/analytics`
/// - `GET /api/data/alerts`
/// - `GET /api/data/settings`
/// - `GET /api/data/system-status`
/// - `POST /api/auth/register`
/// - `POST /api/auth/login`
///
/// CORS allows any origin so the dashboard can be served from anywhere.
pub fn build_router<S: GridStore>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let data = Router::new()
        .route("/dashboard", get(handlers::dashboard::<S>))
        .route("/live-monitor", get(handlers::live_monitor::<S>))
        .route("/analytics", get(handlers::analytics::<S>))
        .route("/alerts", get(handlers::active_alerts::<S>))
        .route("/settings", get(handlers::settings::<S>))
        .route("/system-status", get(handlers::system_status::<S>));

    let auth = Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>));

    Router::new()
        .nest("/api/data", data)
        .nest("/api/auth", auth)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
