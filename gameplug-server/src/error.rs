// File: gameplug-server/src/error.rs

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use gameplug_common::Error;

/// Wraps the core error so handlers can `?` straight into an HTTP response.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "message": msg })),
            Error::InsufficientPoints { required, current } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "message": "Not enough points",
                    "required": required,
                    "current": current,
                }),
            ),
            Error::OutOfStock(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Reward out of stock" }),
            ),
            Error::AlreadyClaimed(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": msg, "already_claimed": true }),
            ),
            Error::AlreadyCompleted(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            other => {
                error!("internal error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
