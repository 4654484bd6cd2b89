//! Short code generation.
//!
//! Codes are drawn from the operating system's secure random source and
//! encoded with the URL-safe base64 alphabet (`A-Z`, `a-z`, `0-9`, `-`, `_`).

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Default length of generated short codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Generates a random short code of exactly `length` characters.
///
/// Reads `ceil(length * 3 / 4)` random bytes, encodes them as URL-safe base64
/// without padding and truncates the result to `length`.
///
/// Collisions are not checked here; the repository rejects a taken code on
/// save.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6)?;
/// assert_eq!(code.len(), 6);
/// ```
pub fn generate_code(length: usize) -> Result<String, AppError> {
    let mut buffer = vec![0u8; (length * 3).div_ceil(4)];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;

    let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
    code.truncate(length);

    Ok(code)
}

/// Returns true if every character of `code` belongs to the URL-safe alphabet.
pub fn is_url_safe(code: &str) -> bool {
    code.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
