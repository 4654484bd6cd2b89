//! In-memory implementation of the URL repository.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{SaveOutcome, UrlRepository};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Store {
    by_code: HashMap<String, UrlRecord>,
    /// original URL -> short code
    by_original: HashMap<String, String>,
    ids: HashSet<String>,
}

/// Repository keeping records in process memory.
///
/// All indexes sit behind one lock so the uniqueness checks and the insert
/// in [`UrlRepository::save`] happen atomically. Short code, original URL and
/// record id are each unique, as in the PostgreSQL schema.
#[derive(Debug, Default)]
pub struct MemoryUrlRepository {
    store: RwLock<Store>,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-filled with `records`.
    ///
    /// Later duplicates of a short code, original URL or record id are skipped.
    pub fn with_records(records: impl IntoIterator<Item = UrlRecord>) -> Self {
        let mut store = Store::default();

        for record in records {
            if store.by_code.contains_key(&record.short)
                || store.by_original.contains_key(&record.original)
                || store.ids.contains(&record.id)
            {
                tracing::warn!(short_url = %record.short, "Skipping duplicate stored record");
                continue;
            }
            store
                .by_original
                .insert(record.original.clone(), record.short.clone());
            store.ids.insert(record.id.clone());
            store.by_code.insert(record.short.clone(), record);
        }

        Self {
            store: RwLock::new(store),
        }
    }

    /// Returns every stored record, oldest first.
    pub async fn snapshot(&self) -> Vec<UrlRecord> {
        let store = self.store.read().await;
        let mut records: Vec<UrlRecord> = store.by_code.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.short.cmp(&b.short)));
        records
    }

    /// Removes the record stored under `short`, if any.
    pub(crate) async fn remove(&self, short: &str) {
        let mut store = self.store.write().await;

        if let Some(record) = store.by_code.remove(short) {
            store.by_original.remove(&record.original);
            store.ids.remove(&record.id);
        }
    }

    /// Marks the owner's live records among `short_codes` as deleted.
    ///
    /// Returns the codes whose flag actually changed.
    pub(crate) async fn mark_deleted(&self, short_codes: &[String], owner_id: &str) -> Vec<String> {
        let mut store = self.store.write().await;
        let mut changed = Vec::new();

        for short in short_codes {
            if let Some(record) = store.by_code.get_mut(short)
                && record.is_owned_by(owner_id)
                && !record.deleted
            {
                record.deleted = true;
                changed.push(short.clone());
            }
        }

        changed
    }

    /// Clears the deleted flag of `short_codes`.
    pub(crate) async fn restore(&self, short_codes: &[String]) {
        let mut store = self.store.write().await;

        for short in short_codes {
            if let Some(record) = store.by_code.get_mut(short) {
                record.deleted = false;
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.by_code.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn save(&self, new_record: NewUrlRecord) -> Result<SaveOutcome, AppError> {
        let mut store = self.store.write().await;

        if let Some(existing) = store
            .by_original
            .get(&new_record.original)
            .and_then(|short| store.by_code.get(short))
        {
            return Ok(SaveOutcome::Existing(existing.clone()));
        }

        if store.by_code.contains_key(&new_record.short) {
            return Err(AppError::short_code_taken(new_record.short));
        }

        if store.ids.contains(&new_record.id) {
            return Err(AppError::conflict(
                "Record id already exists",
                json!({ "id": new_record.id }),
            ));
        }

        let record = new_record.into_record();
        store
            .by_original
            .insert(record.original.clone(), record.short.clone());
        store.ids.insert(record.id.clone());
        store.by_code.insert(record.short.clone(), record.clone());

        Ok(SaveOutcome::Created(record))
    }

    async fn find_by_code(&self, short: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.store.read().await.by_code.get(short).cloned())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<UrlRecord>, AppError> {
        let store = self.store.read().await;

        let mut records: Vec<UrlRecord> = store
            .by_code
            .values()
            .filter(|r| r.is_owned_by(owner_id) && !r.deleted)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.short.cmp(&b.short)));

        Ok(records)
    }

    async fn batch_delete(&self, short_codes: &[String], owner_id: &str) -> Result<u64, AppError> {
        let changed = self.mark_deleted(short_codes, owner_id).await;
        Ok(changed.len() as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_record(short: &str, original: &str, owner: &str) -> NewUrlRecord {
        NewUrlRecord {
            id: format!("id-{short}"),
            original: original.to_string(),
            short: short.to_string(),
            owner_id: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = MemoryUrlRepository::new();

        let outcome = repo
            .save(new_record("abcdef", "https://example.com", "u1"))
            .await
            .unwrap();

        assert!(matches!(outcome, SaveOutcome::Created(_)));

        let found = repo.find_by_code("abcdef").await.unwrap().unwrap();
        assert_eq!(found.original, "https://example.com");
        assert_eq!(found.owner_id, "u1");
        assert!(!found.deleted);
    }

    #[tokio::test]
    async fn test_save_existing_original_returns_stored_record() {
        let repo = MemoryUrlRepository::new();

        repo.save(new_record("abcdef", "https://example.com", "u1"))
            .await
            .unwrap();
        let outcome = repo
            .save(new_record("zzzzzz", "https://example.com", "u2"))
            .await
            .unwrap();

        assert!(outcome.is_existing());
        assert_eq!(outcome.record().short, "abcdef");
        assert_eq!(outcome.record().owner_id, "u1");
        assert!(repo.find_by_code("zzzzzz").await.unwrap().is_none());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_taken_short_code() {
        let repo = MemoryUrlRepository::new();

        repo.save(new_record("abcdef", "https://one.com", "u1"))
            .await
            .unwrap();
        let result = repo
            .save(new_record("abcdef", "https://two.com", "u1"))
            .await;

        assert!(matches!(result, Err(AppError::ShortCodeTaken { .. })));
    }

    #[tokio::test]
    async fn test_save_repeated_id_is_conflict() {
        let repo = MemoryUrlRepository::new();

        let mut first = new_record("aaaaaa", "https://a.com", "u1");
        first.id = "corr-1".to_string();
        let mut second = new_record("bbbbbb", "https://b.com", "u1");
        second.id = "corr-1".to_string();

        repo.save(first).await.unwrap();
        let result = repo.save(second).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
        assert!(repo.find_by_code("bbbbbb").await.unwrap().is_none());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_frees_all_indexes() {
        let repo = MemoryUrlRepository::new();

        repo.save(new_record("aaaaaa", "https://a.com", "u1"))
            .await
            .unwrap();
        repo.remove("aaaaaa").await;

        assert!(repo.is_empty().await);
        let outcome = repo
            .save(new_record("aaaaaa", "https://a.com", "u1"))
            .await
            .unwrap();
        assert!(!outcome.is_existing());
    }

    #[tokio::test]
    async fn test_find_by_code_missing() {
        let repo = MemoryUrlRepository::new();

        assert!(repo.find_by_code("nothere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_owner_excludes_deleted_and_foreign() {
        let repo = MemoryUrlRepository::new();

        repo.save(new_record("aaaaaa", "https://a.com", "u1"))
            .await
            .unwrap();
        repo.save(new_record("bbbbbb", "https://b.com", "u1"))
            .await
            .unwrap();
        repo.save(new_record("cccccc", "https://c.com", "u2"))
            .await
            .unwrap();
        repo.batch_delete(&["bbbbbb".to_string()], "u1")
            .await
            .unwrap();

        let urls = repo.find_by_owner("u1").await.unwrap();

        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].short, "aaaaaa");
        assert!(repo.find_by_owner("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_delete_owner_scoped_and_idempotent() {
        let repo = MemoryUrlRepository::new();

        repo.save(new_record("aaaaaa", "https://a.com", "u1"))
            .await
            .unwrap();
        repo.save(new_record("bbbbbb", "https://b.com", "u2"))
            .await
            .unwrap();

        let codes = vec![
            "aaaaaa".to_string(),
            "bbbbbb".to_string(),
            "missing".to_string(),
        ];

        assert_eq!(repo.batch_delete(&codes, "u1").await.unwrap(), 1);
        assert_eq!(repo.batch_delete(&codes, "u1").await.unwrap(), 0);

        assert!(repo.find_by_code("aaaaaa").await.unwrap().unwrap().deleted);
        assert!(!repo.find_by_code("bbbbbb").await.unwrap().unwrap().deleted);
    }

    #[tokio::test]
    async fn test_concurrent_saves_of_same_original_create_one_record() {
        let repo = Arc::new(MemoryUrlRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.save(new_record(
                        &format!("code{i:02}"),
                        "https://example.com",
                        &format!("u{i}"),
                    ))
                    .await
                    .unwrap()
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if !handle.await.unwrap().is_existing() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_with_records_skips_duplicates() {
        let first = new_record("aaaaaa", "https://a.com", "u1").into_record();
        let same_code = new_record("aaaaaa", "https://other.com", "u1").into_record();
        let same_original = new_record("bbbbbb", "https://a.com", "u1").into_record();

        let repo = MemoryUrlRepository::with_records(vec![first, same_code, same_original]);

        assert_eq!(repo.len().await, 1);
        assert_eq!(repo.snapshot().await[0].original, "https://a.com");
    }
}
