//! Audit sink posting events to an HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::audit_event::AuditEvent;
use crate::domain::audit_worker::AuditWriter;
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends each event as a JSON `POST` body to a fixed URL.
///
/// Any non-2xx answer counts as a failed delivery.
pub struct RemoteAuditWriter {
    url: String,
    client: reqwest::Client,
}

impl RemoteAuditWriter {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::internal("Failed to build audit client", json!({ "reason": e.to_string() }))
            })?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AuditWriter for RemoteAuditWriter {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn write(&self, event: &AuditEvent) -> Result<(), AppError> {
        self.client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map(|_| ())
            .map_err(|e| {
                AppError::internal(
                    "Audit delivery failed",
                    json!({ "url": self.url, "reason": e.to_string() }),
                )
            })
    }
}
