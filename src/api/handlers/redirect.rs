//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
};
use serde_json::json;

use crate::api::middleware::user_id;
use crate::domain::audit_event::AuditAction;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Response Codes
///
/// - **307 Temporary Redirect**: `Location` is the original URL
/// - **404 Not Found**: unknown short code
/// - **410 Gone**: the owner deleted the short URL
///
/// A successful redirect for a caller with a valid `user_id` cookie is
/// recorded as a `follow` audit event. Anonymous callers are not audited.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let record = state.url_service.resolve(&code).await?;

    if record.deleted {
        return Err(AppError::gone(
            "Short URL has been deleted",
            json!({ "short_url": code }),
        ));
    }

    tracing::debug!(code = %code, "Redirecting");

    if let Some(user_id) = user_id::identify(&headers, &state.cookie_signer) {
        state
            .audit
            .log(AuditAction::Follow, &user_id, &record.original);
    }

    Ok(Redirect::temporary(&record.original))
}
