//! Short URL creation, resolution and deletion service.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::delete_request::DeleteRequest;
use crate::domain::delete_worker::{DeleteWorkerSettings, run_delete_worker};
use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{SaveOutcome, UrlRepository};
use crate::error::AppError;
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_code};

/// Attempts at finding a free short code before giving up.
const MAX_CODE_ATTEMPTS: usize = 10;

/// Construction parameters of [`UrlService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlServiceConfig {
    pub code_length: usize,
    pub delete_worker: DeleteWorkerSettings,
}

impl Default for UrlServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            delete_worker: DeleteWorkerSettings::default(),
        }
    }
}

/// Service for shortening, resolving, listing and deleting URLs.
///
/// Shorten, resolve and listing calls go straight to the repository. Deletes
/// are asynchronous: [`Self::batch_delete`] only enqueues a request on a
/// bounded channel that a single background worker drains and applies in
/// batches (see [`crate::domain::delete_worker`]).
///
/// The service is shared between request handlers behind an `Arc` and is safe
/// for concurrent use.
pub struct UrlService {
    repository: Arc<dyn UrlRepository>,
    code_length: usize,
    queue_capacity: usize,
    delete_tx: mpsc::Sender<DeleteRequest>,
    shutdown_tx: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl UrlService {
    /// Creates the service and spawns its delete worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(repository: Arc<dyn UrlRepository>, config: UrlServiceConfig) -> Self {
        let settings = config.delete_worker;
        let queue_capacity = settings.queue_capacity.max(1);

        let (delete_tx, delete_rx) = mpsc::channel(queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = tokio::spawn(run_delete_worker(
            delete_rx,
            repository.clone(),
            settings.batch_size,
            settings.flush_interval,
            shutdown_rx,
        ));
        tracing::info!(
            queue_capacity,
            batch_size = settings.batch_size,
            flush_interval = ?settings.flush_interval,
            "Delete worker started"
        );

        Self {
            repository,
            code_length: config.code_length,
            queue_capacity,
            delete_tx,
            shutdown_tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Creates a short URL for `original`.
    ///
    /// # Arguments
    ///
    /// - `original` - The URL to shorten, already validated by the caller
    /// - `id` - Record identifier; a UUID v4 is generated when empty
    /// - `owner_id` - Creating user, empty for anonymous callers
    ///
    /// # Deduplication
    ///
    /// If `original` is already stored, returns [`SaveOutcome::Existing`] with
    /// the stored record. Its owner is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the random source fails or no free
    /// short code was found after several attempts. Other repository errors
    /// are propagated unchanged.
    pub async fn shorten(
        &self,
        original: &str,
        id: &str,
        owner_id: &str,
    ) -> Result<SaveOutcome, AppError> {
        let id = if id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id.to_string()
        };

        for _ in 0..MAX_CODE_ATTEMPTS {
            let new_record = NewUrlRecord {
                id: id.clone(),
                original: original.to_string(),
                short: generate_code(self.code_length)?,
                owner_id: owner_id.to_string(),
            };

            match self.repository.save(new_record).await {
                Err(AppError::ShortCodeTaken { code }) => {
                    tracing::debug!(code = %code, "Short code collision, regenerating");
                }
                result => return result,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique short code",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Retrieves the record behind a short code.
    ///
    /// Deleted records are returned as well; the caller decides how to answer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this short code.
    pub async fn resolve(&self, short: &str) -> Result<UrlRecord, AppError> {
        self.repository
            .find_by_code(short)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "short_url": short })))
    }

    /// Lists the owner's records that are not deleted.
    ///
    /// An owner without records gets an empty vector.
    pub async fn get_user_urls(&self, owner_id: &str) -> Result<Vec<UrlRecord>, AppError> {
        self.repository.find_by_owner(owner_id).await
    }

    /// Schedules `short_codes` for soft deletion on behalf of `owner_id`.
    ///
    /// Returns as soon as the request is queued. Waits only while the queue is
    /// full. Whether a code existed, belonged to the owner or was already
    /// deleted is never reported; failures are logged by the worker.
    pub async fn batch_delete(&self, short_codes: Vec<String>, owner_id: &str) {
        if short_codes.is_empty() {
            return;
        }

        let request = DeleteRequest::new(short_codes, owner_id);

        match self.delete_tx.send(request).await {
            Ok(()) => {
                metrics::counter!("delete_requests_enqueued_total").increment(1);
            }
            Err(mpsc::error::SendError(request)) => {
                tracing::warn!(
                    owner_id = %request.owner_id,
                    codes = request.short_codes.len(),
                    "Delete queue is closed, dropping request"
                );
            }
        }
    }

    /// Checks that the repository is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Maximum number of requests the delete queue buffers.
    pub fn delete_queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Number of requests currently waiting in the delete queue.
    pub fn delete_queue_len(&self) -> usize {
        self.queue_capacity - self.delete_tx.capacity()
    }

    /// Returns true once the delete worker has stopped accepting requests.
    pub fn is_delete_queue_closed(&self) -> bool {
        self.delete_tx.is_closed()
    }

    /// Stops the delete worker after flushing every queued request.
    ///
    /// Subsequent [`Self::batch_delete`] calls are dropped. Calling this more
    /// than once is harmless.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(worker) = self.worker.lock().await.take()
            && let Err(e) = worker.await
        {
            tracing::error!(error = %e, "Delete worker terminated abnormally");
        }
    }
}
