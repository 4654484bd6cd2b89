//! Application services.

pub mod audit_service;
pub mod url_service;

pub use audit_service::AuditService;
pub use url_service::{UrlService, UrlServiceConfig};
