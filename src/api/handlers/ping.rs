//! Handler for storage liveness check.

use axum::{extract::State, http::StatusCode};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Checks that the storage backend is reachable.
///
/// # Endpoint
///
/// `GET /ping`
///
/// Responds with **200 OK**, or **500 Internal Server Error** if the
/// repository ping fails.
pub async fn ping_handler(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.url_service.ping().await.map_err(|e| {
        AppError::internal("Storage unavailable", json!({ "reason": e.to_string() }))
    })?;

    Ok(StatusCode::OK)
}
