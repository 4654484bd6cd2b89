//! Repository trait for short URL storage.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Result of [`UrlRepository::save`].
///
/// The repository is the single authority on uniqueness of the original URL.
/// Saving an original that is already stored is not an error: the stored
/// record is handed back unchanged, ownership included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record was inserted.
    Created(UrlRecord),
    /// A record with the same original URL already existed.
    Existing(UrlRecord),
}

impl SaveOutcome {
    pub fn record(&self) -> &UrlRecord {
        match self {
            SaveOutcome::Created(record) | SaveOutcome::Existing(record) => record,
        }
    }

    pub fn into_record(self) -> UrlRecord {
        match self {
            SaveOutcome::Created(record) | SaveOutcome::Existing(record) => record,
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, SaveOutcome::Existing(_))
    }
}

/// Repository interface for short URL records.
///
/// Implementations must be safe for concurrent use: request handlers call
/// `save`/`find_*` concurrently while the delete worker calls `batch_delete`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - In-process maps
/// - [`crate::infrastructure::persistence::FileUrlRepository`] - In-memory with a JSON snapshot file
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Stores a new record unless its original URL is already known.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ShortCodeTaken`] if the short code is already used
    /// by a different original URL.
    ///
    /// Returns [`AppError::Conflict`] if another record already has the same id.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn save(&self, new_record: NewUrlRecord) -> Result<SaveOutcome, AppError>;

    /// Finds a record by short code, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_code(&self, short: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Lists the owner's records that are not deleted, oldest first.
    ///
    /// An owner without records yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<UrlRecord>, AppError>;

    /// Marks the owner's records among `short_codes` as deleted.
    ///
    /// Codes that are unknown, owned by someone else, or already deleted are
    /// ignored. Returns the number of records newly marked.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn batch_delete(&self, short_codes: &[String], owner_id: &str) -> Result<u64, AppError>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
