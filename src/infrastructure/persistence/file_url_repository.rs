//! File-backed implementation of the URL repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{SaveOutcome, UrlRepository};
use crate::error::AppError;
use crate::infrastructure::persistence::MemoryUrlRepository;

/// Repository serving reads from memory and mirroring every change to a JSON file.
///
/// The file holds a pretty-printed JSON array of [`UrlRecord`]s. It is read
/// once on [`FileUrlRepository::open`] and rewritten after each created
/// record and each batch delete that changed something. Writes go to a
/// sibling temporary file which is then renamed over the snapshot.
///
/// Mutations hold `write_lock` until the snapshot is written. If writing fails
/// the in-memory change is rolled back, so memory never holds state the file
/// does not.
pub struct FileUrlRepository {
    inner: MemoryUrlRepository,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileUrlRepository {
    /// Opens the snapshot at `path`, creating an empty store if the file is
    /// missing or empty.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the file cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let records = load_records(&path).await?;

        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "Loaded URL storage file"
        );

        Ok(Self {
            inner: MemoryUrlRepository::with_records(records),
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the snapshot. Callers hold `write_lock`.
    async fn persist(&self) -> Result<(), AppError> {
        let records = self.inner.snapshot().await;
        let data = serde_json::to_vec_pretty(&records)?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }
}

async fn load_records(path: &Path) -> Result<Vec<UrlRecord>, AppError> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_slice(&data)?)
}

#[async_trait]
impl UrlRepository for FileUrlRepository {
    async fn save(&self, new_record: NewUrlRecord) -> Result<SaveOutcome, AppError> {
        let _guard = self.write_lock.lock().await;

        let outcome = self.inner.save(new_record).await?;

        if let SaveOutcome::Created(ref record) = outcome
            && let Err(e) = self.persist().await
        {
            tracing::error!(short_url = %record.short, error = %e, "Failed to persist new record");
            self.inner.remove(&record.short).await;
            return Err(e);
        }

        Ok(outcome)
    }

    async fn find_by_code(&self, short: &str) -> Result<Option<UrlRecord>, AppError> {
        self.inner.find_by_code(short).await
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<UrlRecord>, AppError> {
        self.inner.find_by_owner(owner_id).await
    }

    async fn batch_delete(&self, short_codes: &[String], owner_id: &str) -> Result<u64, AppError> {
        let _guard = self.write_lock.lock().await;

        let changed = self.inner.mark_deleted(short_codes, owner_id).await;

        if !changed.is_empty()
            && let Err(e) = self.persist().await
        {
            tracing::error!(owner_id = %owner_id, error = %e, "Failed to persist deletes");
            self.inner.restore(&changed).await;
            return Err(e);
        }

        Ok(changed.len() as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        tokio::fs::metadata(dir)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }
}
