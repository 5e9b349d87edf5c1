//! Axum extractor resolving the caller from the `Authorization` header.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::domain::{Role, UserId};
use crate::error::ApiError;

/// The verified caller identity injected into protected handlers.
///
/// Extraction fails with 401 when the bearer token is missing or does
/// not verify; role/ownership checks beyond that are the services'
/// concern.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Caller's account id.
    pub user_id: UserId,
    /// Caller's email at token issue time.
    pub email: String,
    /// Caller's role.
    pub role: Role,
}

impl AuthUser {
    /// Returns `true` for admin callers.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: axum::extract::FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("expected bearer token".to_string()))?;

        let claims = state.token_keys.verify(token)?;

        let user_id = uuid::Uuid::parse_str(&claims.sub)
            .map(UserId::from_uuid)
            .map_err(|_| ApiError::Unauthorized("malformed token subject".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}
