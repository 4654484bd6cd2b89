//! API route configuration.
//!
//! Every route here runs behind [`crate::api::middleware::user_id`], which
//! the top-level router attaches.

use crate::api::handlers::{
    delete_user_urls_handler, shorten_batch_handler, shorten_json_handler, user_urls_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Shorten one URL (JSON)
/// - `POST   /shorten/batch`  - Shorten several URLs
/// - `GET    /user/urls`      - List the caller's URLs
/// - `DELETE /user/urls`      - Queue deletion of the caller's URLs
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_json_handler))
        .route("/shorten/batch", post(shorten_batch_handler))
        .route(
            "/user/urls",
            get(user_urls_handler).delete(delete_user_urls_handler),
        )
}
