//! DTOs for batch shortening.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One URL of a batch request.
///
/// The correlation id is echoed back and stored as the record id.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchShortenItem {
    #[validate(length(max = 128))]
    pub correlation_id: String,

    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchShortenResult {
    pub correlation_id: String,
    pub short_url: String,
}
