//! Registration and login handlers.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `POST` | `/api/auth/register` | `201 {"msg": "User registered successfully!"}` |
//! | `POST` | `/api/auth/login` | `200 {"token": "..."}` |
//!
//! Both answer `400 {"msg": ...}` on bad input; login never reveals
//! whether the email or the password was wrong.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use gridwatch_core::auth::{Credentials, Registration};
use gridwatch_core::store::GridStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Body returned on successful registration.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub msg: String,
}

/// Body returned on successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Signed session token.
    pub token: String,
}

/// Register a new dashboard user.
pub async fn register<S: GridStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(registration) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state.auth.register(registration).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            msg: String::from("User registered successfully!"),
        }),
    ))
}

/// Exchange credentials for a session token.
pub async fn login<S: GridStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(credentials) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let token = state.auth.login(credentials).await?;
    Ok(Json(TokenResponse { token }))
}
