//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /`            - Shorten a plain-text URL
//! - `GET  /{code}`      - Short link redirect
//! - `GET  /ping`        - Storage liveness
//! - `GET  /health`      - Health check: storage, delete queue
//! - `/api/*`            - JSON API
//!
//! # Middleware
//!
//! - **User identity** - Signed `user_id` cookie on `POST /` and `/api/*`
//! - **Tracing** - Structured request/response logging
//! - **Compression** - gzip responses, gzip request bodies
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, ping_handler, redirect_handler, shorten_text_handler};
use crate::api::middleware::{tracing, user_id};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and middleware without trailing slash normalization.
pub fn router(state: AppState) -> Router {
    let identified = Router::new()
        .route("/", post(shorten_text_handler))
        .nest("/api", api::routes::api_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), user_id::layer));

    Router::new()
        .merge(identified)
        .route("/{code}", get(redirect_handler))
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(RequestDecompressionLayer::new())
        .layer(CompressionLayer::new())
        .layer(tracing::layer())
}
