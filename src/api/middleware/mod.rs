//! HTTP middleware for request processing.
//!
//! Provides user identification and observability middleware.

pub mod tracing;
pub mod user_id;
