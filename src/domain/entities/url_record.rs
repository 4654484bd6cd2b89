//! URL record entity representing a short code to original URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored short URL mapping.
///
/// Records are never physically removed. Deletion sets `deleted`, after which
/// the short code still resolves to the record so callers can answer
/// `410 Gone` instead of `404 Not Found`.
///
/// The serde representation is the on-disk format of
/// [`crate::infrastructure::persistence::FileUrlRepository`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    #[serde(rename = "uuid")]
    pub id: String,
    #[serde(rename = "original_url")]
    pub original: String,
    #[serde(rename = "short_url")]
    pub short: String,
    /// Empty for anonymous callers.
    #[serde(rename = "user_id", default)]
    pub owner_id: String,
    #[serde(rename = "is_deleted", default)]
    pub deleted: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        id: String,
        original: String,
        short: String,
        owner_id: String,
        deleted: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original,
            short,
            owner_id,
            deleted,
            created_at,
        }
    }

    /// Returns true if the record belongs to `owner_id`.
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// Input data for storing a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub id: String,
    pub original: String,
    pub short: String,
    pub owner_id: String,
}

impl NewUrlRecord {
    /// Materializes the record as it is stored, not deleted, created now.
    pub fn into_record(self) -> UrlRecord {
        UrlRecord::new(
            self.id,
            self.original,
            self.short,
            self.owner_id,
            false,
            Utc::now(),
        )
    }
}
