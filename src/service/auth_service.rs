//! Auth service: account creation, login, and profile lookup.

use std::sync::Arc;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::TokenKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::domain::{Role, UserDirectory, UserId, UserRecord};
use crate::error::ApiError;

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupInput {
    /// Login email.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Display name.
    pub full_name: String,
    /// Requested role; defaults to a regular attendee.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginInput {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// A freshly issued credential plus the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    /// Signed bearer token.
    pub token: String,
    /// The account record (hash included; never serialized directly).
    pub user: UserRecord,
}

/// Account management on top of the user directory.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<UserDirectory>,
    keys: Arc<TokenKeys>,
}

impl AuthService {
    /// Creates a new `AuthService`.
    #[must_use]
    pub fn new(users: Arc<UserDirectory>, keys: Arc<TokenKeys>) -> Self {
        Self { users, keys }
    }

    /// Creates an account and issues its first token.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] on empty fields,
    /// [`ApiError::Conflict`] when the email is taken.
    pub async fn register(&self, input: SignupInput) -> Result<AuthOutcome, ApiError> {
        if input.email.trim().is_empty()
            || input.password.is_empty()
            || input.full_name.trim().is_empty()
        {
            return Err(ApiError::Validation("missing required fields".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let record = UserRecord::new(
            input.email.trim().to_string(),
            password_hash,
            input.full_name.trim().to_string(),
            input.role.unwrap_or(Role::User),
        );
        let user_id = self.users.insert(record.clone()).await?;
        let token = self.keys.issue(&record)?;
        tracing::info!(%user_id, "user registered");
        Ok(AuthOutcome {
            token,
            user: record,
        })
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] on any credential mismatch.
    pub async fn login(&self, input: LoginInput) -> Result<AuthOutcome, ApiError> {
        let invalid = || ApiError::Unauthorized("invalid credentials".to_string());
        let user = self
            .users
            .find_by_email(&input.email)
            .await
            .ok_or_else(invalid)?;
        if !verify_password(&input.password, &user.password_hash) {
            return Err(invalid());
        }
        let token = self.keys.issue(&user)?;
        Ok(AuthOutcome { token, user })
    }

    /// Fetches the account behind a verified token.
    ///
    /// # Errors
    ///
    /// [`ApiError::UserNotFound`] when the account no longer exists.
    pub async fn profile(&self, user_id: UserId) -> Result<UserRecord, ApiError> {
        self.users.get(user_id).await
    }
}
