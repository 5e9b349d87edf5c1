//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};

/// Simple message acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message string.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query parameters for event listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Case-insensitive substring matched against title and
    /// description.
    #[serde(default)]
    pub q: Option<String>,
}
