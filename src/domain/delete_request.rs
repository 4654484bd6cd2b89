//! Deletion request model for asynchronous batch deletes.

/// A request to soft-delete short codes on behalf of one owner.
///
/// Created per [`crate::application::services::UrlService::batch_delete`] call,
/// sent through the bounded delete queue and consumed by
/// [`crate::domain::delete_worker::run_delete_worker`]. Never persisted.
///
/// The owner scope is applied by the repository: codes that do not exist,
/// belong to someone else, or are already deleted are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub short_codes: Vec<String>,
    pub owner_id: String,
}

impl DeleteRequest {
    pub fn new(short_codes: Vec<String>, owner_id: impl Into<String>) -> Self {
        Self {
            short_codes,
            owner_id: owner_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_request_creation() {
        let request = DeleteRequest::new(vec!["abc".to_string(), "def".to_string()], "u1");

        assert_eq!(request.short_codes, vec!["abc", "def"]);
        assert_eq!(request.owner_id, "u1");
    }

    #[test]
    fn test_delete_request_anonymous_owner() {
        let request = DeleteRequest::new(vec![], String::new());

        assert!(request.short_codes.is_empty());
        assert!(request.owner_id.is_empty());
    }
}
