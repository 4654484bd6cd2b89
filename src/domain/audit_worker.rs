//! Audit sinks and the background task feeding each of them.
//!
//! Every registered [`AuditWriter`] gets its own bounded queue and worker, so
//! a slow sink never holds back the others. Delivery is best effort: a failed
//! write is logged and counted, and the event is not retried.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::domain::audit_event::AuditEvent;
use crate::error::AppError;

/// Destination for audit events.
///
/// # Implementations
///
/// - [`crate::infrastructure::audit::FileAuditWriter`] - JSON lines appended to a file
/// - [`crate::infrastructure::audit::RemoteAuditWriter`] - JSON `POST` to an HTTP endpoint
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditWriter: Send + Sync {
    /// Short sink name used in logs.
    fn name(&self) -> &'static str;

    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the sink rejects or cannot be reached.
    async fn write(&self, event: &AuditEvent) -> Result<(), AppError>;
}

/// Runs one audit worker until shutdown.
///
/// Events already queued when `shutdown` fires are still delivered before
/// the worker returns.
pub async fn run_audit_worker(
    mut rx: mpsc::Receiver<AuditEvent>,
    writer: Arc<dyn AuditWriter>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            received = rx.recv() => match received {
                Some(event) => deliver(writer.as_ref(), &event).await,
                None => break,
            },
        }
    }

    rx.close();
    while let Some(event) = rx.recv().await {
        deliver(writer.as_ref(), &event).await;
    }

    tracing::info!(sink = writer.name(), "Audit worker stopped");
}

async fn deliver(writer: &dyn AuditWriter, event: &AuditEvent) {
    match writer.write(event).await {
        Ok(()) => {
            metrics::counter!("audit_events_written_total", "sink" => writer.name()).increment(1);
        }
        Err(e) => {
            tracing::warn!(
                sink = writer.name(),
                action = ?event.action,
                error = %e,
                "Failed to write audit event"
            );
            metrics::counter!("audit_events_failed_total", "sink" => writer.name()).increment(1);
        }
    }
}
