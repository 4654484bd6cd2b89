//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.

pub mod url_repository;

pub use url_repository::{SaveOutcome, UrlRepository};

#[cfg(test)]
pub use url_repository::MockUrlRepository;
