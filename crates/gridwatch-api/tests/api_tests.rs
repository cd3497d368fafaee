//! Integration tests for the dashboard API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, against the in-memory store.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeDelta, Utc};
use gridwatch_api::router::build_router;
use gridwatch_api::state::AppState;
use gridwatch_core::auth::{AuthService, PasswordHasher, TokenSigner};
use gridwatch_core::memory::MemoryStore;
use gridwatch_core::monitor::SimulationMonitor;
use gridwatch_core::store::AlertLedger;
use gridwatch_types::{Alert, Line, LineStatus, Telemetry};
use serde_json::Value;
use tower::ServiceExt;

const SECRET: &str = "api-test-secret";

fn make_state(store: MemoryStore) -> Arc<AppState<MemoryStore>> {
    let auth = AuthService::new(
        store.clone(),
        PasswordHasher::new(1_000),
        TokenSigner::new(SECRET, TimeDelta::hours(5)),
    );
    Arc::new(AppState::new(
        store,
        auth,
        Arc::new(SimulationMonitor::new()),
    ))
}

fn line(name: &str, location: &str, status: LineStatus, reading: Telemetry) -> Line {
    let mut line = Line::new(name, location);
    line.status = status;
    line.apply_telemetry(reading);
    line
}

const HEALTHY: Telemetry = Telemetry {
    voltage: 230.0,
    current: 15.0,
    temperature: 45.0,
};

const FAULTED: Telemetry = Telemetry {
    voltage: 120.0,
    current: 40.0,
    temperature: 80.0,
};

/// Four lines, Feeder Line 02 in fault with an active alert.
async fn populated_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .put_line(line("Feeder Line 03", "Kochi Metro", LineStatus::Operational, HEALTHY))
        .await;
    store
        .put_line(line("Feeder Line 01", "Trivandrum North", LineStatus::Operational, HEALTHY))
        .await;
    store
        .put_line(line("Feeder Line 04", "Palakkad Rural", LineStatus::Operational, HEALTHY))
        .await;
    let faulted = line("Feeder Line 02", "Kollam Industrial", LineStatus::Fault, FAULTED);
    store.put_line(faulted.clone()).await;
    store.open_for(faulted.id, &faulted.name).await.unwrap();
    store
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_post(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

// =========================================================================
// Data endpoints
// =========================================================================

#[tokio::test]
async fn test_dashboard_with_one_fault() {
    let router = build_router(make_state(populated_store().await));

    let response = router.oneshot(get("/api/data/dashboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["systemStatus"], "Fault Detected");
    assert_eq!(json["activeAlerts"], 1);
    assert_eq!(json["linesMonitored"], 4);
    assert_eq!(json["onlineLines"], 4);
    // Three healthy lines at 3.45 kW each; the faulted line is excluded.
    let load = json["systemLoad"].as_f64().unwrap();
    assert!((load - 10.35).abs() < 1e-9, "systemLoad = {load}");
}

#[tokio::test]
async fn test_dashboard_empty_registry() {
    let router = build_router(make_state(MemoryStore::new()));

    let response = router.oneshot(get("/api/data/dashboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["systemStatus"], "Operational");
    assert_eq!(json["linesMonitored"], 0);
    assert_eq!(json["systemLoad"], 0.0);
}

#[tokio::test]
async fn test_live_monitor_is_name_ordered() {
    let router = build_router(make_state(populated_store().await));

    let response = router.oneshot(get("/api/data/live-monitor")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Feeder Line 01", "Feeder Line 02", "Feeder Line 03", "Feeder Line 04"]
    );
    assert_eq!(json[1]["status"], "Fault");
    assert!(json[0]["currentLoad"].is_number());
    assert!(json[0]["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_analytics_returns_resolved_newest_first() {
    let store = MemoryStore::new();
    let base = Utc::now();
    for minutes in 0..25 {
        let mut alert = Alert::raise(gridwatch_types::LineId::new(), "Feeder Line 01");
        alert.resolve_at(base + TimeDelta::minutes(minutes));
        store.put_alert(alert).await;
    }
    // Still active, never listed in analytics.
    store
        .put_alert(Alert::raise(gridwatch_types::LineId::new(), "Feeder Line 02"))
        .await;
    let router = build_router(make_state(store));

    let response = router
        .clone()
        .oneshot(get("/api/data/analytics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let alerts = json.as_array().unwrap();
    assert_eq!(alerts.len(), 20);
    assert!(alerts.iter().all(|a| a["status"] == "Resolved"));
    let first: chrono::DateTime<Utc> =
        serde_json::from_value(alerts[0]["resolvedTimestamp"].clone()).unwrap();
    let second: chrono::DateTime<Utc> =
        serde_json::from_value(alerts[1]["resolvedTimestamp"].clone()).unwrap();
    assert!(first > second);

    let response = router
        .oneshot(get("/api/data/analytics?limit=5"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_analytics_rejects_bad_limit() {
    let router = build_router(make_state(MemoryStore::new()));

    let response = router
        .oneshot(get("/api/data/analytics?limit=lots"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["msg"].is_string());
}

#[tokio::test]
async fn test_active_alerts() {
    let router = build_router(make_state(populated_store().await));

    let response = router.oneshot(get("/api/data/alerts")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let alerts = json.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["lineName"], "Feeder Line 02");
    assert_eq!(alerts[0]["type"], "Overload");
    assert_eq!(alerts[0]["status"], "Active");
    assert!(alerts[0]["resolvedTimestamp"].is_null());
}

#[tokio::test]
async fn test_settings_placeholder() {
    let router = build_router(make_state(MemoryStore::new()));

    let response = router.oneshot(get("/api/data/settings")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["alertThreshold"], 25.0);
    assert_eq!(json["notificationEmail"], "admin@ksebl.com");
}

#[tokio::test]
async fn test_system_status() {
    let state = make_state(MemoryStore::new());
    let router = build_router(Arc::clone(&state));

    let response = router.oneshot(get("/api/data/system-status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["apiStatus"], "Online");
    assert_eq!(json["dbStatus"], "Connected");
    assert_eq!(json["simulationStatus"], "Starting");
    assert_eq!(json["ticksCompleted"], 0);
    assert!(json["lastTickAt"].is_null());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let router = build_router(make_state(MemoryStore::new()));

    let response = router.oneshot(get("/api/data/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =========================================================================
// Auth endpoints
// =========================================================================

fn registration() -> Value {
    serde_json::json!({
        "firstName": "Asha",
        "lastName": "Nair",
        "email": "asha@example.com",
        "password": "correct horse",
    })
}

#[tokio::test]
async fn test_register_then_login() {
    let state = make_state(MemoryStore::new());
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(json_post("/api/auth/register", &registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["msg"], "User registered successfully!");

    let response = router
        .oneshot(json_post(
            "/api/auth/login",
            &serde_json::json!({ "email": "asha@example.com", "password": "correct horse" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let token = json["token"].as_str().unwrap();
    let claims = state.auth.signer().verify(token, Utc::now()).unwrap();
    assert_eq!(claims.exp - claims.iat, 5 * 3600);
}

#[tokio::test]
async fn test_duplicate_registration() {
    let router = build_router(make_state(MemoryStore::new()));

    let first = router
        .clone()
        .oneshot(json_post("/api/auth/register", &registration()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .oneshot(json_post("/api/auth/register", &registration()))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(second.into_body()).await;
    assert_eq!(json["msg"], "User already exists");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let router = build_router(make_state(MemoryStore::new()));
    router
        .clone()
        .oneshot(json_post("/api/auth/register", &registration()))
        .await
        .unwrap();

    let response = router
        .oneshot(json_post(
            "/api/auth/login",
            &serde_json::json!({ "email": "asha@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["msg"], "Invalid Credentials");
    assert!(json.get("token").is_none());
}

#[tokio::test]
async fn test_login_unknown_email() {
    let router = build_router(make_state(MemoryStore::new()));

    let response = router
        .oneshot(json_post(
            "/api/auth/login",
            &serde_json::json!({ "email": "ghost@example.com", "password": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["msg"], "Invalid Credentials");
}

#[tokio::test]
async fn test_register_malformed_body() {
    let router = build_router(make_state(MemoryStore::new()));

    let response = router
        .oneshot(json_post(
            "/api/auth/register",
            &serde_json::json!({ "email": "asha@example.com" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    let json = body_to_json(response.into_body()).await;
    assert!(json["msg"].is_string());
}

#[tokio::test]
async fn test_register_invalid_email() {
    let router = build_router(make_state(MemoryStore::new()));
    let mut body = registration();
    body["email"] = Value::from("not-an-email");

    let response = router
        .oneshot(json_post("/api/auth/register", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
