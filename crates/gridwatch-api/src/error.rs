//! Error types for the dashboard API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"msg": "..."}`. Server-side failures are
//! logged with their cause and answered with a generic `Server Error`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gridwatch_core::auth::AuthError;
use gridwatch_core::store::StoreError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A store read or write failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Registration or login failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// The request body or query string could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => {
                (StatusCode::BAD_REQUEST, String::from("Invalid Credentials"))
            }
            Self::Auth(AuthError::UserExists) => {
                (StatusCode::BAD_REQUEST, String::from("User already exists"))
            }
            Self::Auth(AuthError::InvalidInput(msg)) | Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Auth(
                AuthError::InvalidToken(_)
                | AuthError::TokenExpired
                | AuthError::Store(_)
                | AuthError::Internal(_),
            )
            | Self::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("Server Error"),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({ "msg": message });
        (status, axum::Json(body)).into_response()
    }
}
