//! Shared state handed to every request handler.

use std::sync::Arc;

use crate::application::services::{AuditService, UrlService};
use crate::utils::user_cookie::UserCookieSigner;

#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    /// Prefix of returned short URLs, without trailing slash.
    pub base_url: String,
    pub cookie_signer: UserCookieSigner,
    pub audit: Arc<AuditService>,
}

impl AppState {
    pub fn new(
        url_service: Arc<UrlService>,
        base_url: impl Into<String>,
        cookie_signer: UserCookieSigner,
    ) -> Self {
        Self {
            url_service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie_signer,
            audit: Arc::new(AuditService::disabled()),
        }
    }

    /// Replaces the audit service, which is disabled by default.
    pub fn with_audit(mut self, audit: Arc<AuditService>) -> Self {
        self.audit = audit;
        self
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
