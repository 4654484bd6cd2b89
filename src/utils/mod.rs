//! Utility functions.
//!
//! - [`code_generator`] - Short code generation
//! - [`user_cookie`] - Signing and verification of the `user_id` cookie

pub mod code_generator;
pub mod user_cookie;
