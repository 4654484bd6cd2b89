//! Audit sinks.
//!
//! - [`FileAuditWriter`] - JSON lines appended to a local file
//! - [`RemoteAuditWriter`] - JSON `POST` per event to an HTTP endpoint

pub mod file_audit_writer;
pub mod remote_audit_writer;

pub use file_audit_writer::FileAuditWriter;
pub use remote_audit_writer::RemoteAuditWriter;
