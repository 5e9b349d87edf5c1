//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Notification failures never appear here: delivery is best-effort and
//! only ever logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BlobId, EventId, RegistrationId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "missing required bank details fields: ifsc_code",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category           | HTTP Status                |
/// |-----------|--------------------|----------------------------|
/// | 1000–1099 | Validation/Capacity| 400 Bad Request            |
/// | 1100–1199 | Auth               | 401 / 403                  |
/// | 2000–2099 | Not Found          | 404 Not Found              |
/// | 2100–2199 | Conflict           | 409 Conflict               |
/// | 3000–3999 | Server             | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed (malformed input, missing fields).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Event has no remaining capacity slots.
    #[error("event {0} is full")]
    Capacity(EventId),

    /// Missing or unverifiable bearer credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller role or ownership does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Registration with the given ID was not found.
    #[error("registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    /// Stored file with the given ID was not found.
    #[error("file not found: {0}")]
    BlobNotFound(BlobId),

    /// User account was not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// No event carries the given share token.
    #[error("event not found for share token {0}")]
    ShareNotFound(String),

    /// State conflict (e.g. duplicate email at sign-up).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Blob backend failure; the owning operation is aborted with no
    /// partial commit.
    #[error("storage error: {0}")]
    Storage(String),

    /// Snapshot persistence failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::Capacity(_) => 1002,
            Self::Unauthorized(_) => 1101,
            Self::Forbidden(_) => 1102,
            Self::EventNotFound(_) => 2001,
            Self::RegistrationNotFound(_) => 2002,
            Self::BlobNotFound(_) => 2003,
            Self::UserNotFound(_) => 2004,
            Self::ShareNotFound(_) => 2005,
            Self::Conflict(_) => 2101,
            Self::Storage(_) => 3001,
            Self::Persistence(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Capacity(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::EventNotFound(_)
            | Self::RegistrationNotFound(_)
            | Self::BlobNotFound(_)
            | Self::UserNotFound(_)
            | Self::ShareNotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Persistence(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::EventId;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::Validation("missing title".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn capacity_maps_to_bad_request() {
        let err = ApiError::Capacity(EventId::new());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1002);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        let unauthorized = ApiError::Unauthorized("no token".to_string());
        assert_eq!(unauthorized.status_code(), StatusCode::UNAUTHORIZED);

        let forbidden = ApiError::Forbidden("admin access required".to_string());
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn not_found_variants_map_to_404() {
        let err = ApiError::EventNotFound(EventId::new());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_maps_to_internal_server_error() {
        let err = ApiError::Storage("blob store not initialized".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn error_body_serializes_with_code_and_message() {
        let err = ApiError::Validation("bad input".to_string());
        let body = ErrorResponse {
            error: ErrorBody {
                code: err.error_code(),
                message: err.to_string(),
                details: None,
            },
        };
        let json = serde_json::to_value(&body).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        assert_eq!(json["error"]["code"], 1001);
        assert!(
            json["error"]["message"]
                .as_str()
                .is_some_and(|m| m.contains("bad input"))
        );
    }
}
