//! Handlers for the caller's own URLs.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::user_urls::UserUrlItem;
use crate::api::middleware::user_id::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the URLs the caller created and has not deleted.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response
///
/// ```json
/// [
///   { "short_url": "http://localhost:8080/aB3_x9", "original_url": "https://example.com" }
/// ]
/// ```
///
/// Responds with **204 No Content** when the caller has no URLs.
pub async fn user_urls_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let records = state.url_service.get_user_urls(&user.0).await?;

    if records.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items: Vec<UserUrlItem> = records
        .into_iter()
        .map(|record| UserUrlItem {
            short_url: state.short_url(&record.short),
            original_url: record.original,
        })
        .collect();

    Ok(Json(items).into_response())
}

/// Schedules deletion of the caller's short URLs.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["aB3_x9", "Zk81_q"]
/// ```
///
/// Responds with **202 Accepted** once the request is queued. Codes that do
/// not exist or belong to another user are ignored by the delete worker.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(codes): Json<Vec<String>>,
) -> StatusCode {
    let codes: Vec<String> = codes
        .into_iter()
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect();

    state.url_service.batch_delete(codes, &user.0).await;

    StatusCode::ACCEPTED
}
