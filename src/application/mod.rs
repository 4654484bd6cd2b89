//! Application layer services implementing business logic.
//!
//! Services consume repository traits and give HTTP handlers a storage-agnostic
//! API.
//!
//! - [`services::UrlService`] - shortening, resolution, listing and queued deletion
//! - [`services::AuditService`] - fan-out of user actions to audit sinks

pub mod services;
