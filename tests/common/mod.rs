#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use url_shortener::application::services::{UrlService, UrlServiceConfig};
use url_shortener::domain::delete_worker::DeleteWorkerSettings;
use url_shortener::domain::repositories::UrlRepository;
use url_shortener::infrastructure::persistence::MemoryUrlRepository;
use url_shortener::routes::router;
use url_shortener::state::AppState;
use url_shortener::utils::user_cookie::{USER_ID_COOKIE, UserCookieSigner};

pub const BASE_URL: &str = "http://short.test";
pub const COOKIE_SECRET: &str = "test-cookie-secret";

/// Worker settings that flush quickly so tests can poll for results.
pub fn fast_service_config() -> UrlServiceConfig {
    UrlServiceConfig {
        code_length: 6,
        delete_worker: DeleteWorkerSettings {
            queue_capacity: 100,
            batch_size: 50,
            flush_interval: Duration::from_millis(20),
        },
    }
}

pub fn create_test_state(repository: Arc<dyn UrlRepository>) -> AppState {
    let url_service = Arc::new(UrlService::new(repository, fast_service_config()));

    AppState::new(url_service, BASE_URL, UserCookieSigner::new(COOKIE_SECRET))
}

/// Server over an empty in-memory repository.
pub fn create_test_server() -> (TestServer, AppState) {
    let state = create_test_state(Arc::new(MemoryUrlRepository::new()));
    let server = TestServer::new(router(state.clone())).unwrap();

    (server, state)
}

/// `Cookie` header value identifying `user_id`.
pub fn cookie_for(user_id: &str) -> String {
    format!(
        "{}={}",
        USER_ID_COOKIE,
        UserCookieSigner::new(COOKIE_SECRET).sign(user_id)
    )
}

/// Strips the base URL from a returned short URL.
pub fn code_of(short_url: &str) -> String {
    short_url
        .strip_prefix(&format!("{BASE_URL}/"))
        .unwrap_or_else(|| panic!("unexpected short URL {short_url}"))
        .to_string()
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
