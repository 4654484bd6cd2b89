//! Audit event model.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// User action recorded by the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// A new short URL was created.
    Shorten,
    /// A short URL was followed by an identified user.
    Follow,
}

/// One audit trail entry.
///
/// Serialized as `{"ts": <unix seconds>, "action": "shorten", "user_id": "...", "url": "..."}`.
/// `url` is always the original URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub ts: i64,
    pub action: AuditAction,
    pub user_id: String,
    pub url: String,
}

impl AuditEvent {
    /// Creates an event stamped with the current time.
    pub fn new(action: AuditAction, user_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            ts: Utc::now().timestamp(),
            action,
            user_id: user_id.into(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audit_event_wire_format() {
        let event = AuditEvent {
            ts: 1_700_000_000,
            action: AuditAction::Follow,
            user_id: "u1".to_string(),
            url: "https://example.com".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "ts": 1_700_000_000,
                "action": "follow",
                "user_id": "u1",
                "url": "https://example.com"
            })
        );
    }

    #[test]
    fn test_audit_event_new_is_stamped_now() {
        let before = Utc::now().timestamp();
        let event = AuditEvent::new(AuditAction::Shorten, "u1", "https://example.com");
        let after = Utc::now().timestamp();

        assert!(event.ts >= before && event.ts <= after);
        assert_eq!(event.action, AuditAction::Shorten);
    }
}
