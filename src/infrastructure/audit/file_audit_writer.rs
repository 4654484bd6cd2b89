//! Audit sink appending JSON lines to a file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::domain::audit_event::AuditEvent;
use crate::domain::audit_worker::AuditWriter;
use crate::error::AppError;

/// Appends one JSON object per line to `path`, creating the file on first write.
pub struct FileAuditWriter {
    path: PathBuf,
}

impl FileAuditWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditWriter for FileAuditWriter {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn write(&self, event: &AuditEvent) -> Result<(), AppError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }
}
