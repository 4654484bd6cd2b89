//! Handlers for URL shortening endpoints.

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::batch::{BatchShortenItem, BatchShortenResult};
use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::user_id::CurrentUser;
use crate::domain::audit_event::AuditAction;
use crate::domain::repositories::SaveOutcome;
use crate::error::AppError;
use crate::state::AppState;

fn outcome_status(outcome: &SaveOutcome) -> StatusCode {
    if outcome.is_existing() {
        StatusCode::CONFLICT
    } else {
        StatusCode::CREATED
    }
}

/// Records a `shorten` audit event when the URL was newly stored.
fn audit_created(state: &AppState, outcome: &SaveOutcome, user_id: &str) {
    if let SaveOutcome::Created(record) = outcome {
        state
            .audit
            .log(AuditAction::Shorten, user_id, &record.original);
    }
}

/// Checks a plain-text URL body and returns it trimmed.
fn parse_text_url(body: &str) -> Result<&str, AppError> {
    let original = body.trim();

    if original.is_empty() {
        return Err(AppError::bad_request(
            "Empty URL",
            json!({ "reason": "Request body must contain a URL" }),
        ));
    }

    let parsed = url::Url::parse(original).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "Invalid URL format",
            json!({ "reason": "Only http and https URLs are supported" }),
        ));
    }

    Ok(original)
}

/// Shortens a URL sent as plain text.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response Codes
///
/// - **201 Created**: body is the new short URL
/// - **409 Conflict**: URL was already shortened, body is the existing short URL
/// - **400 Bad Request**: body is empty or not an http(s) URL
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    body: String,
) -> Result<Response, AppError> {
    let original = parse_text_url(&body)?;

    let outcome = state.url_service.shorten(original, "", &user.0).await?;
    let status = outcome_status(&outcome);
    audit_created(&state, &outcome, &user.0);

    Ok((
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.short_url(&outcome.record().short),
    )
        .into_response())
}

/// Shortens a URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/aB3_x9" }
/// ```
///
/// Sent with **201 Created**, or **409 Conflict** when the URL was already
/// shortened.
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let outcome = state.url_service.shorten(&payload.url, "", &user.0).await?;
    let status = outcome_status(&outcome);
    audit_created(&state, &outcome, &user.0);

    let response = ShortenResponse {
        result: state.short_url(&outcome.record().short),
    };

    Ok((status, Json(response)).into_response())
}

/// Shortens several URLs in one request.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [
///   { "correlation_id": "1", "original_url": "https://example.com/a" },
///   { "correlation_id": "2", "original_url": "https://example.com/b" }
/// ]
/// ```
///
/// Every item is validated before anything is stored. Items whose URL was
/// already shortened report the existing short URL. Responds with
/// **201 Created** and one result per item, in request order.
///
/// A `correlation_id` that repeats the id of a stored record fails the
/// request with **409 Conflict**; items before it stay stored.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(items): Json<Vec<BatchShortenItem>>,
) -> Result<(StatusCode, Json<Vec<BatchShortenResult>>), AppError> {
    if items.is_empty() {
        return Err(AppError::bad_request(
            "Empty batch",
            json!({ "reason": "At least one URL is required" }),
        ));
    }

    for item in &items {
        item.validate()?;
    }

    let mut results = Vec::with_capacity(items.len());

    for item in items {
        let outcome = state
            .url_service
            .shorten(&item.original_url, &item.correlation_id, &user.0)
            .await?;
        audit_created(&state, &outcome, &user.0);

        results.push(BatchShortenResult {
            correlation_id: item.correlation_id,
            short_url: state.short_url(&outcome.record().short),
        });
    }

    Ok((StatusCode::CREATED, Json(results)))
}
