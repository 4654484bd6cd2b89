//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`delete_request`] - Deletion request model
//! - [`delete_worker`] - Batching background delete worker
//! - [`audit_event`] - Audit trail entry
//! - [`audit_worker`] - Audit sink trait and per-sink delivery worker
//!
//! # Delete Flow
//!
//! 1. HTTP handler calls [`crate::application::services::UrlService::batch_delete`]
//! 2. A [`delete_request::DeleteRequest`] is pushed onto a bounded channel
//! 3. [`delete_worker::run_delete_worker`] accumulates requests and flushes them per owner
//! 4. Records are soft-deleted via [`repositories::UrlRepository::batch_delete`]

pub mod audit_event;
pub mod audit_worker;
pub mod delete_request;
pub mod delete_worker;
pub mod entities;
pub mod repositories;
