//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{SaveOutcome, UrlRepository};
use crate::error::AppError;

/// Unique constraint on `urls.short_url` created by the initial migration.
const SHORT_URL_CONSTRAINT: &str = "urls_short_url_key";

#[derive(Debug, sqlx::FromRow)]
struct UrlRow {
    id: String,
    original_url: String,
    short_url: String,
    user_id: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord::new(
            row.id,
            row.original_url,
            row.short_url,
            row.user_id,
            row.is_deleted,
            row.created_at,
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SavedRow {
    #[sqlx(flatten)]
    row: UrlRow,
    is_conflict: bool,
}

/// PostgreSQL repository for short URL records.
///
/// Uniqueness of original URLs and short codes is enforced by the `urls`
/// table constraints, so concurrent saves across server instances stay
/// consistent.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(self.pool.as_ref())
            .await
            .map_err(|e| {
                AppError::internal(
                    "Database migration failed",
                    serde_json::json!({ "reason": e.to_string() }),
                )
            })
    }

    async fn find_by_original(&self, original: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_url, user_id, is_deleted, created_at
            FROM urls
            WHERE original_url = $1
            "#,
        )
        .bind(original)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn save(&self, new_record: NewUrlRecord) -> Result<SaveOutcome, AppError> {
        let result = sqlx::query_as::<_, SavedRow>(
            r#"
            WITH inserted AS (
                INSERT INTO urls (id, original_url, short_url, user_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (original_url) DO NOTHING
                RETURNING id, original_url, short_url, user_id, is_deleted, created_at
            )
            SELECT id, original_url, short_url, user_id, is_deleted, created_at,
                   FALSE AS is_conflict
            FROM inserted
            UNION ALL
            SELECT id, original_url, short_url, user_id, is_deleted, created_at,
                   TRUE AS is_conflict
            FROM urls
            WHERE original_url = $2 AND NOT EXISTS (SELECT 1 FROM inserted)
            "#,
        )
        .bind(&new_record.id)
        .bind(&new_record.original)
        .bind(&new_record.short)
        .bind(&new_record.owner_id)
        .fetch_optional(self.pool.as_ref())
        .await;

        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                if let Some(db) = e.as_database_error()
                    && db.is_unique_violation()
                    && db.constraint() == Some(SHORT_URL_CONSTRAINT)
                {
                    return Err(AppError::short_code_taken(new_record.short));
                }
                return Err(e.into());
            }
        };

        match saved {
            Some(SavedRow {
                row,
                is_conflict: false,
            }) => Ok(SaveOutcome::Created(row.into())),
            Some(SavedRow {
                row,
                is_conflict: true,
            }) => Ok(SaveOutcome::Existing(row.into())),
            // A concurrent insert of the same URL committed after this
            // statement's snapshot was taken.
            None => self
                .find_by_original(&new_record.original)
                .await?
                .map(SaveOutcome::Existing)
                .ok_or_else(|| {
                    AppError::internal(
                        "Stored URL vanished after conflict",
                        serde_json::json!({ "original_url": new_record.original }),
                    )
                }),
        }
    }

    async fn find_by_code(&self, short: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_url, user_id, is_deleted, created_at
            FROM urls
            WHERE short_url = $1
            "#,
        )
        .bind(short)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<UrlRecord>, AppError> {
        let rows = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_url, user_id, is_deleted, created_at
            FROM urls
            WHERE user_id = $1 AND NOT is_deleted
            ORDER BY created_at, short_url
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn batch_delete(&self, short_codes: &[String], owner_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE urls
            SET is_deleted = TRUE
            WHERE short_url = ANY($1) AND user_id = $2 AND NOT is_deleted
            "#,
        )
        .bind(short_codes)
        .bind(owner_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
