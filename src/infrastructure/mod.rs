//! Infrastructure layer for external integrations.
//!
//! Implements the repository and audit sink traits defined by the domain layer.

pub mod audit;
pub mod persistence;
