//! Background worker that batches soft-delete requests.
//!
//! A single worker per [`crate::application::services::UrlService`] drains the
//! bounded delete queue into a [`PendingBatch`] and applies it to the
//! repository when either the batch reaches `batch_size` requests, or the
//! queue has gone quiet for `flush_interval`.
//!
//! # Flush
//!
//! Requests are grouped by owner and each owner's short codes are merged into
//! one de-duplicated set, so a flush issues exactly one
//! [`UrlRepository::batch_delete`] call per distinct owner. A failed call is
//! logged and its requests are dropped; the worker keeps running.
//!
//! # Shutdown
//!
//! When the shutdown signal fires, or every queue sender is dropped, the
//! worker closes the queue, drains what is already buffered, flushes and
//! returns.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};

use crate::domain::delete_request::DeleteRequest;
use crate::domain::repositories::UrlRepository;

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Tuning knobs of the delete queue and worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteWorkerSettings {
    /// Number of requests the queue buffers before `batch_delete` callers wait.
    pub queue_capacity: usize,
    /// Number of accumulated requests that triggers an immediate flush.
    pub batch_size: usize,
    /// How long a non-empty batch waits for more requests once the queue is empty.
    pub flush_interval: Duration,
}

impl Default for DeleteWorkerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// Delete requests accumulated between two flushes.
#[derive(Debug, Default)]
pub struct PendingBatch {
    requests: Vec<DeleteRequest>,
}

impl PendingBatch {
    pub fn push(&mut self, request: DeleteRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Empties the batch, returning the short codes to delete per owner.
    ///
    /// Codes within one owner are sorted and de-duplicated.
    pub fn take_grouped(&mut self) -> HashMap<String, Vec<String>> {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();

        for request in self.requests.drain(..) {
            groups
                .entry(request.owner_id)
                .or_default()
                .extend(request.short_codes);
        }

        for codes in groups.values_mut() {
            codes.sort_unstable();
            codes.dedup();
        }

        groups
    }
}

enum WorkerState {
    Draining,
    IdleWait { deadline: Instant },
    Flushing,
}

/// Runs the delete worker until shutdown.
///
/// # Arguments
///
/// - `rx` - Receiving half of the bounded delete queue
/// - `repository` - Store the batches are applied to
/// - `batch_size` - Flush threshold, in requests (values below 1 are treated as 1)
/// - `flush_interval` - Idle wait before a partial batch is flushed
/// - `shutdown` - Flips to `true` (or is dropped) when the worker must stop
pub async fn run_delete_worker(
    mut rx: mpsc::Receiver<DeleteRequest>,
    repository: Arc<dyn UrlRepository>,
    batch_size: usize,
    flush_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let batch_size = batch_size.max(1);
    let mut batch = PendingBatch::default();
    let mut state = WorkerState::Draining;

    loop {
        state = match state {
            WorkerState::Draining => match rx.try_recv() {
                Ok(request) => {
                    batch.push(request);
                    if batch.len() >= batch_size {
                        WorkerState::Flushing
                    } else {
                        WorkerState::Draining
                    }
                }
                Err(TryRecvError::Empty) if batch.is_empty() => {
                    // Nothing pending: park on the queue.
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => break,
                        received = rx.recv() => match received {
                            Some(request) => {
                                batch.push(request);
                                if batch.len() >= batch_size {
                                    WorkerState::Flushing
                                } else {
                                    WorkerState::Draining
                                }
                            }
                            None => break,
                        },
                    }
                }
                Err(TryRecvError::Empty) => WorkerState::IdleWait {
                    deadline: Instant::now() + flush_interval,
                },
                Err(TryRecvError::Disconnected) => break,
            },
            WorkerState::IdleWait { deadline } => {
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    _ = sleep_until(deadline) => WorkerState::Flushing,
                    received = rx.recv() => match received {
                        Some(request) => {
                            batch.push(request);
                            if batch.len() >= batch_size {
                                WorkerState::Flushing
                            } else {
                                WorkerState::IdleWait { deadline }
                            }
                        }
                        None => break,
                    },
                }
            }
            WorkerState::Flushing => {
                flush(repository.as_ref(), &mut batch).await;
                WorkerState::Draining
            }
        };
    }

    rx.close();
    while let Some(request) = rx.recv().await {
        batch.push(request);
        if batch.len() >= batch_size {
            flush(repository.as_ref(), &mut batch).await;
        }
    }
    flush(repository.as_ref(), &mut batch).await;

    tracing::info!("Delete worker stopped");
}

async fn flush(repository: &dyn UrlRepository, batch: &mut PendingBatch) {
    if batch.is_empty() {
        return;
    }

    let request_count = batch.len();

    for (owner_id, short_codes) in batch.take_grouped() {
        match repository.batch_delete(&short_codes, &owner_id).await {
            Ok(deleted) => {
                tracing::debug!(
                    owner_id = %owner_id,
                    requested = short_codes.len(),
                    deleted,
                    "Applied batch delete"
                );
            }
            Err(e) => {
                metrics::counter!("delete_flush_failures_total").increment(1);
                tracing::error!(
                    error = %e,
                    owner_id = %owner_id,
                    codes = short_codes.len(),
                    "Batch delete failed, dropping requests"
                );
            }
        }
    }

    metrics::counter!("delete_batches_flushed_total").increment(1);
    tracing::debug!(requests = request_count, "Flushed delete batch");
}
