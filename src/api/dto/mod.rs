//! Data Transfer Objects for API requests and responses.
//!
//! JSON bodies use Serde; request DTOs are checked with validator.

pub mod batch;
pub mod health;
pub mod shorten;
pub mod user_urls;
