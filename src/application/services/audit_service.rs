//! Fan-out of audit events to the configured sinks.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::audit_event::{AuditAction, AuditEvent};
use crate::domain::audit_worker::{AuditWriter, run_audit_worker};

pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 1024;

struct Sink {
    name: &'static str,
    tx: mpsc::Sender<AuditEvent>,
}

/// Records user actions to every registered [`AuditWriter`].
///
/// [`Self::log`] never waits: each sink has its own bounded queue and worker,
/// and an event that does not fit a full queue is dropped for that sink with
/// a warning. With no sinks the service is a no-op.
pub struct AuditService {
    sinks: Vec<Sink>,
    shutdown_tx: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl AuditService {
    /// Spawns one worker per writer.
    ///
    /// Must be called from within a Tokio runtime when `writers` is non-empty.
    pub fn new(writers: Vec<Arc<dyn AuditWriter>>, queue_capacity: usize) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        let mut sinks = Vec::with_capacity(writers.len());
        let mut workers = Vec::with_capacity(writers.len());

        for writer in writers {
            let (tx, rx) = mpsc::channel(queue_capacity.max(1));
            let name = writer.name();

            workers.push(tokio::spawn(run_audit_worker(
                rx,
                writer,
                shutdown_tx.subscribe(),
            )));
            sinks.push(Sink { name, tx });

            tracing::info!(sink = name, "Audit sink registered");
        }

        Self {
            sinks,
            shutdown_tx,
            workers: Mutex::new(workers),
        }
    }

    /// Service without sinks.
    pub fn disabled() -> Self {
        Self::new(Vec::new(), DEFAULT_AUDIT_QUEUE_CAPACITY)
    }

    pub fn is_enabled(&self) -> bool {
        !self.sinks.is_empty()
    }

    /// Queues an event for every sink.
    pub fn log(&self, action: AuditAction, user_id: &str, url: &str) {
        if self.sinks.is_empty() {
            return;
        }

        let event = AuditEvent::new(action, user_id, url);

        for sink in &self.sinks {
            if let Err(e) = sink.tx.try_send(event.clone()) {
                let reason = match e {
                    mpsc::error::TrySendError::Full(_) => "queue full",
                    mpsc::error::TrySendError::Closed(_) => "queue closed",
                };
                tracing::warn!(sink = sink.name, reason, "Dropping audit event");
                metrics::counter!("audit_events_dropped_total", "sink" => sink.name).increment(1);
            }
        }
    }

    /// Stops all workers after they deliver what is already queued.
    ///
    /// Later [`Self::log`] calls are dropped. Calling this more than once is
    /// harmless.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        let workers: Vec<JoinHandle<()>> = self.workers.lock().await.drain(..).collect();
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Audit worker terminated abnormally");
            }
        }
    }
}
